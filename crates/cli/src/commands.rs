//! Subcommand implementations.
//!
//! User-facing output goes to stdout in Spanish; diagnostics go through
//! `tracing`.

use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;

use analyzer::{AnalysisDraft, AnalysisOutcome, AnalysisPipeline, PipelineState};
use anyhow::{Context, Result};
use api::{AppState, INCOHERENT_MESSAGE};
use pipeline::{preview, recent, AnalysisRecord, Category, HistoryStatistics, HistoryStore};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

/// One pass over `text`, persisted.
pub async fn analyze(
    pipeline: &AnalysisPipeline,
    store: &dyn HistoryStore,
    text: &str,
) -> Result<()> {
    let mut state = PipelineState::new();
    match pipeline.analyze(text, &mut state).await {
        AnalysisOutcome::Rejected(_) => println!("{INCOHERENT_MESSAGE}"),
        AnalysisOutcome::Completed(draft) => {
            if draft.formalized {
                println!("El comentario contenía lenguaje inapropiado y fue formalizado.");
            }
            let record = persist(store, draft).await?;
            print_record(&record);
        }
    }
    Ok(())
}

/// Prompt loop over stdin.
///
/// A formalized comment is shown first; accepting it re-enters the pipeline
/// with the same state, so it is saved without another model call. Anything
/// else typed at that point is analysed as a new comment.
pub async fn interactive(pipeline: &AnalysisPipeline, store: &dyn HistoryStore) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pending: Option<(AnalysisDraft, PipelineState)> = None;

    loop {
        match &pending {
            Some(_) => prompt("Escribe 's' para aceptarlo o un nuevo comentario: ")?,
            None => prompt("Comentario (línea vacía para salir): ")?,
        }
        let Some(line) = lines.next_line().await.context("failed to read stdin")? else {
            break;
        };
        let line = line.trim();

        if let Some((draft, mut state)) = pending.take() {
            if line.eq_ignore_ascii_case("s") {
                match pipeline.analyze(draft.comment.as_str(), &mut state).await {
                    AnalysisOutcome::Rejected(_) => println!("{INCOHERENT_MESSAGE}"),
                    AnalysisOutcome::Completed(accepted) => {
                        let record = persist(store, accepted).await?;
                        print_record(&record);
                    }
                }
                continue;
            }
        }
        if line.is_empty() {
            break;
        }

        let mut state = PipelineState::new();
        match pipeline.analyze(line, &mut state).await {
            AnalysisOutcome::Rejected(_) => println!("{INCOHERENT_MESSAGE}"),
            AnalysisOutcome::Completed(draft) if draft.formalized => {
                println!("Tu comentario contiene lenguaje inapropiado. Versión formalizada:");
                println!("  {}", draft.comment);
                pending = Some((draft, state));
            }
            AnalysisOutcome::Completed(draft) => {
                let record = persist(store, draft).await?;
                print_record(&record);
            }
        }
    }
    Ok(())
}

/// Runs the HTTP API until the process is stopped.
pub async fn serve(
    pipeline: AnalysisPipeline,
    store: Arc<dyn HistoryStore>,
    bind: SocketAddr,
) -> Result<()> {
    api::serve(bind, AppState::new(pipeline, store))
        .await
        .with_context(|| format!("HTTP server on {bind} failed"))
}

pub async fn history(store: &dyn HistoryStore, last: usize) -> Result<()> {
    let records = store.read_all().await.context("failed to read history")?;
    if records.is_empty() {
        println!("No hay comentarios analizados todavía.");
        return Ok(());
    }
    println!("Últimos {} de {} análisis:", last.min(records.len()), records.len());
    for record in recent(&records, last) {
        println!(
            "#{} [{}] {} | {} | tags: {}",
            record.id,
            record.timestamp,
            record.category,
            preview(record.comment.as_str()),
            format_tags(&record.tags)
        );
    }
    Ok(())
}

pub async fn stats(store: &dyn HistoryStore) -> Result<()> {
    let records = store.read_all().await.context("failed to read history")?;
    print!("{}", render_statistics(&HistoryStatistics::from_records(&records)));
    Ok(())
}

pub async fn clear(store: &dyn HistoryStore) -> Result<()> {
    store.clear().await.context("failed to clear history")?;
    println!("Historial limpiado.");
    Ok(())
}

async fn persist(store: &dyn HistoryStore, draft: AnalysisDraft) -> Result<AnalysisRecord> {
    let record = store
        .append(draft.into_new_record())
        .await
        .context("Error al guardar el análisis")?;
    info!(id = %record.id, "analysis persisted");
    Ok(record)
}

fn prompt(text: &str) -> Result<()> {
    print!("{text}");
    std::io::stdout().flush().context("failed to flush stdout")
}

fn print_record(record: &AnalysisRecord) {
    println!("Guardado #{}", record.id);
    println!("  Comentario: {}", record.comment);
    println!("  Categoría:  {}", record.category);
    println!("  Tags:       {}", format_tags(&record.tags));
}

fn format_tags(tags: &[String]) -> String {
    if tags.is_empty() {
        "(ninguno)".to_string()
    } else {
        tags.join(", ")
    }
}

fn render_statistics(stats: &HistoryStatistics) -> String {
    let mut out = format!("Total de comentarios: {}\n", stats.total);
    out.push_str("Por categoría:\n");
    for category in Category::ALL {
        out.push_str(&format!("  {category}: {}\n", stats.count_for(category)));
    }
    if !stats.top_tags.is_empty() {
        out.push_str("Tags más comunes:\n");
        for tag in &stats.top_tags {
            out.push_str(&format!("  {}: {}\n", tag.tag, tag.count));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    use pipeline::{NewRecord, RecordId, Timestamp};

    fn record(id: u64, category: Category, tags: &[&str]) -> AnalysisRecord {
        AnalysisRecord::from_new(
            RecordId::new(id),
            Timestamp::now(),
            NewRecord {
                comment: pipeline::Comment::new("la cafetería es cara").unwrap(),
                category,
                tags: tags.iter().map(|t| t.to_string()).collect(),
            },
        )
    }

    #[test]
    fn test_format_tags() {
        assert_eq!(format_tags(&[]), "(ninguno)");
        assert_eq!(
            format_tags(&["clase".to_string(), "maestro".to_string()]),
            "clase, maestro"
        );
    }

    #[test]
    fn test_statistics_list_every_category() {
        let records = vec![
            record(1, Category::Opinion, &["cafetería"]),
            record(2, Category::Opinion, &["cafetería", "precio"]),
            record(3, Category::HateSpeech, &[]),
        ];
        let rendered = render_statistics(&HistoryStatistics::from_records(&records));

        assert!(rendered.starts_with("Total de comentarios: 3\n"));
        assert!(rendered.contains("  Opinion: 2\n"));
        assert!(rendered.contains("  HateSpeech: 1\n"));
        assert!(rendered.contains("  Sugerencia: 0\n"));
        assert!(rendered.contains("  Vida universitaria: 0\n"));
        assert!(rendered.contains("  cafetería: 2\n"));
    }

    #[test]
    fn test_empty_statistics_omit_tag_section() {
        let rendered = render_statistics(&HistoryStatistics::from_records(&[]));
        assert!(rendered.contains("Total de comentarios: 0"));
        assert!(!rendered.contains("Tags más comunes"));
    }
}
