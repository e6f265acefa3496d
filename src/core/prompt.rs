pub const DEFAULT_MARKER: &str = "✖";

const COMMENT_ONLY_TEMPLATE: &str = r#"
Eres un revisor de código.
Se han detectado cambios SOLO en COMENTARIOS.
Por favor revisa únicamente la ortografía, acentos correctos en español,
y la claridad de los comentarios agregados o modificados.

Cambios en comentarios:
{diff}"#;

const FULL_REVIEW_TEMPLATE: &str = r#"
Eres un revisor de código.

Tarea:
- Evalúa los cambios en los archivos según el checklist.
- Da retroalimentación agrupada por archivo.
- Solo menciona los puntos que NO cumplen ({marker}).
- Si un archivo cumple con todo, no lo menciones.
- Sé determinista, intenta no variar la salida si el contenido no cambió.
- Usa saltos de línea para separar los archivos y títulos de los archivos con sus explicaciones.
- Revisa faltas de ortografía, acentos correctos en español en valores de cadenas.

Checklist:
{checklist}

Código modificado (git diff):
{diff}

Formato de salida esperado (en markdown):
##Archivo: NOMBRE_DEL_ARCHIVO
{marker} Punto incumplido 1
{marker} Punto incumplido 2
---
##Archivo: OTRO_ARCHIVO
{marker} Punto incumplido 1
---
"#;

/// Builds the single instruction sent to the reviewer model.
///
/// Template choice depends only on `comment_only`; the checklist and diff are
/// embedded verbatim.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    marker: String,
}

impl PromptBuilder {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    pub fn build_prompt(&self, checklist: &str, diff: &str, comment_only: bool) -> String {
        // The diff is substituted last so placeholder-looking text inside it
        // is never expanded.
        if comment_only {
            COMMENT_ONLY_TEMPLATE.replace("{diff}", diff)
        } else {
            let (head, tail) = FULL_REVIEW_TEMPLATE
                .split_once("{diff}")
                .unwrap_or((FULL_REVIEW_TEMPLATE, ""));
            let head = head
                .replace("{marker}", &self.marker)
                .replacen("{checklist}", checklist, 1);
            let tail = tail.replace("{marker}", &self.marker);
            format!("{head}{diff}{tail}")
        }
    }
}
