//! Prompt templates sent to the model.
//!
//! Both templates ask for bare text so that the response can be interpreted by
//! [`pipeline::match_category_label`] and [`pipeline::clean_formalized`].

const COMMENT_PLACEHOLDER: &str = "{comment}";

const CLASSIFICATION_TEMPLATE: &str = r#"Clasifica el siguiente comentario EXACTAMENTE en una de estas cuatro categorías:
- "Sugerencia": propone mejoras, ideas, cambios o recomendaciones constructivas.
- "Opinion": expresa una opinión personal neutral o positiva, o una experiencia, sin ser ofensivo.
- "HateSpeech": contiene lenguaje ofensivo o discriminatorio, amenazas, insultos, críticas muy negativas o sentimientos muy negativos hacia personas (por ejemplo "el maestro es malo", "odio a...", "es terrible").
- "Vida universitaria": trata de experiencias, situaciones, actividades o aspectos de la vida universitaria, académica o estudiantil que no encajan en las demás categorías.

Reglas:
1. Responde SOLO con una de estas palabras: "Sugerencia", "Opinion", "HateSpeech" o "Vida universitaria".
2. No añadas explicaciones.
3. Los comentarios negativos sobre personas (maestros, compañeros, etc.) son "HateSpeech".
4. Los comentarios sobre clases, universidad, estudios o campus son "Vida universitaria".
5. En caso de duda, prioriza en este orden: HateSpeech > Vida universitaria > Sugerencia > Opinion.

Ejemplos:
- "El maestro es malo" -> HateSpeech
- "La clase de matemáticas es difícil" -> Vida universitaria
- "Deberían mejorar la cafetería" -> Sugerencia
- "Me gusta estudiar" -> Opinion

Comentario: "{comment}"

Categoría:"#;

const FORMALIZATION_TEMPLATE: &str = r#"El siguiente comentario contiene lenguaje ofensivo. Reescríbelo como un comentario formal, respetuoso y constructivo que exprese la misma idea de forma apropiada para un entorno académico o profesional.

Reglas:
1. Elimina todas las palabras ofensivas, vulgaridades e insultos.
2. Conserva la esencia del mensaje con un tono constructivo.
3. Usa lenguaje formal y respetuoso.
4. Si es una queja, conviértela en retroalimentación constructiva.
5. Máximo 2 o 3 líneas.
6. Responde SOLO con el texto reescrito, sin explicaciones.

Comentario original: "{comment}"

Comentario formalizado:"#;

/// Builds the classification prompt for `comment`.
pub fn classification_prompt(comment: &str) -> String {
    CLASSIFICATION_TEMPLATE.replace(COMMENT_PLACEHOLDER, comment)
}

/// Builds the formalization prompt for `comment`.
pub fn formalization_prompt(comment: &str) -> String {
    FORMALIZATION_TEMPLATE.replace(COMMENT_PLACEHOLDER, comment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipeline::Category;

    #[test]
    fn test_classification_prompt_embeds_comment_and_every_label() {
        let prompt = classification_prompt("la cafetería es cara");
        assert!(prompt.contains("Comentario: \"la cafetería es cara\""));
        for category in Category::ALL {
            assert!(prompt.contains(category.label()), "missing {category}");
        }
        assert!(!prompt.contains(COMMENT_PLACEHOLDER));
    }

    #[test]
    fn test_formalization_prompt_embeds_comment() {
        let prompt = formalization_prompt("el maestro es malo");
        assert!(prompt.contains("Comentario original: \"el maestro es malo\""));
        assert!(!prompt.contains(COMMENT_PLACEHOLDER));
    }
}
