//! Prompt construction for risk extraction.

use radar_core::Language;

/// Fixed system message. The user prompt carries the language-specific
/// instructions.
pub const SYSTEM_PROMPT: &str = "You are an interdisciplinary committee of experts \
(civil and railway engineering, German infrastructure law, procurement and logistics) \
analysing planning risks in infrastructure projects. You answer only with JSON.";

struct Labels {
    preamble: &'static str,
    text_heading: &'static str,
    context_heading: &'static str,
    closing: &'static str,
}

const ES: Labels = Labels {
    preamble: "Lee un FRAGMENTO de un documento técnico de proyecto (no el documento completo) \
y detecta los riesgos de planificación que puedan causar retrasos, sobrecostes, conflictos \
contractuales o fallos operativos.\n\
Clasifica los riesgos en dos listas: \"intuitive_risks\" y \"counterintuitive_risks\". \
Cada lista puede tener de 0 a N riesgos; no inventes ni repitas riesgos genéricos.\n\
Considera riesgo todo lo que afecte a TIEMPO, COSTE, EJECUCIÓN, SEGURIDAD o ACEPTACIÓN \
SOCIAL/REGULATORIA.\n\
Para cada riesgo incluye \"risk\" (enunciado breve), \"justification\", \"countermeasure\", \
\"page\" (página o sección si se puede inferir de los marcadores [Page N]) y \"evidence\" \
(cita textual breve).\n\
Ignora encabezados, pies de página y numeración. Responde en español.",
    text_heading: "Texto analizado:",
    context_heading: "Contexto adicional:",
    closing: "Devuelve únicamente un JSON válido con exactamente dos listas:",
};

const EN: Labels = Labels {
    preamble: "Read a FRAGMENT of a technical project document (not the whole document) \
and detect planning risks that may cause delays, cost overruns, contractual conflicts or \
operational failures.\n\
Classify the risks into two lists: \"intuitive_risks\" and \"counterintuitive_risks\". \
Each list may hold 0 to N risks; do not invent or repeat generic risks.\n\
Treat as a risk anything affecting TIME, COST, EXECUTION, SAFETY or SOCIAL/REGULATORY \
ACCEPTANCE.\n\
For each risk include \"risk\" (short statement), \"justification\", \"countermeasure\", \
\"page\" (page or section if it can be inferred from the [Page N] markers) and \"evidence\" \
(short verbatim excerpt).\n\
Ignore headers, footers and page numbering. Answer in English.",
    text_heading: "Analyzed text:",
    context_heading: "Additional context:",
    closing: "Return ONLY valid JSON with exactly two lists:",
};

const DE: Labels = Labels {
    preamble: "Lesen Sie ein FRAGMENT eines technischen Projektdokuments (nicht das ganze \
Dokument) und erkennen Sie Planungsrisiken, die Verzögerungen, Kostensteigerungen, \
vertragliche Konflikte oder betriebliche Ausfälle verursachen können.\n\
Ordnen Sie die Risiken zwei Listen zu: \"intuitive_risks\" und \"counterintuitive_risks\". \
Jede Liste kann 0 bis N Risiken enthalten; erfinden oder wiederholen Sie keine generischen \
Risiken.\n\
Als Risiko gilt alles, was ZEIT, KOSTEN, AUSFÜHRUNG, SICHERHEIT oder SOZIALE/REGULATORISCHE \
AKZEPTANZ betrifft.\n\
Geben Sie pro Risiko \"risk\" (kurze Aussage), \"justification\", \"countermeasure\", \
\"page\" (Seite oder Abschnitt, falls aus den [Page N]-Markierungen ableitbar) und \
\"evidence\" (kurzes wörtliches Zitat) an.\n\
Ignorieren Sie Kopf- und Fußzeilen sowie Seitenzahlen. Antworten Sie auf Deutsch.",
    text_heading: "Analysierter Text:",
    context_heading: "Zusätzlicher Kontext:",
    closing: "Geben Sie NUR gültiges JSON mit genau zwei Listen zurück:",
};

const SCHEMA_HINT: &str = "{\n  \"intuitive_risks\": [...],\n  \"counterintuitive_risks\": [...]\n}";

/// Truncate to at most `max_chars` characters, never splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Build the user prompt for one piece of document text.
pub fn build_user_prompt(text: &str, context: &str, lang: Language, max_chars: usize) -> String {
    let labels = match lang {
        Language::Es => &ES,
        Language::En => &EN,
        Language::De => &DE,
    };
    format!(
        "{}\n\n{}\n{}\n\n{}\n{}\n\n{}\n{}",
        labels.preamble,
        labels.text_heading,
        truncate_chars(text, max_chars),
        labels.context_heading,
        context.trim(),
        labels.closing,
        SCHEMA_HINT,
    )
}
