//! The transcription prompt sent with every page image.
//!
//! Centralising the prompt here serves two purposes:
//!
//! 1. **Single source of truth** — tweaking how diagrams or math are handled
//!    requires editing exactly one place.
//!
//! 2. **Testability** — unit tests can inspect the prompt directly without
//!    spinning up a real vision model.

/// Prompt asking the vision model for a JSON object with `latex` and
/// `markdown` transcripts of a handwritten page.
///
/// The JSON contract matches [`crate::content::PageContent::Structured`];
/// the request also sets `responseMimeType: application/json` so the model
/// is forced to return a parseable body.
pub const TRANSCRIPTION_PROMPT: &str = r#"You are an expert academic typesetter. Transcribe the handwritten notes in this image into both high-quality LaTeX and a standard Markdown document. Return a JSON object with two keys: "latex" and "markdown".

Rules for LaTeX:

1. CONTENT ACCURACY
   - Transcribe the text exactly as written, preserving the original meaning
   - Do not summarise or alter the content

2. MATH
   - Convert all mathematical expressions into valid LaTeX
   - Use standard notation for fractions, superscripts, subscripts, integrals
   - Delimit equations properly: inline $...$, display $$...$$, or
     \begin{align}...\end{align} / \begin{equation}...\end{equation}

3. FIGURES AND DIAGRAMS
   - Do NOT attempt ASCII art
   - For any diagram, plot, or figure insert a placeholder figure environment
     with a detailed descriptive caption based on the surrounding context:
     \begin{figure}[h!]
     \centering
     %% INSERT IMAGE HERE
     \caption{A descriptive caption based on the context of the diagram.}
     \label{fig:description}
     \end{figure}

4. STRUCTURE
   - Use semantic environments (\begin{theorem}, \begin{lemma}, ...) and
     section commands where the notes call for them

5. OUTPUT
   - Return ONLY the LaTeX body in the "latex" value — no preamble, no
     \documentclass, no \begin{document}

Rules for Markdown:

1. Transcribe into standard Markdown (# headings, **bold**, *italics*, lists)
2. Preserve formulas with $ (inline) and $$ (display) delimiters so MathJax
   can render them
3. For figures and diagrams insert a placeholder image link with a detailed
   descriptive caption, e.g. ![caption based on context](image_placeholder.png)"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_demands_both_keys() {
        assert!(TRANSCRIPTION_PROMPT.contains("\"latex\""));
        assert!(TRANSCRIPTION_PROMPT.contains("\"markdown\""));
    }

    #[test]
    fn prompt_forbids_preamble() {
        assert!(TRANSCRIPTION_PROMPT.contains("no preamble"));
    }
}
