//! Extraction prompt for chemotherapy order templates.
//!
//! The instruction list and schema block are fixed; the uploaded
//! document's text is embedded verbatim at the end. Chat messages carry
//! no template at all — the user's text goes to the model as-is.

/// Build the extraction prompt for one order template.
pub fn build_extraction_prompt(document_text: &str) -> String {
    format!(
        r#"Extract the following information from this chemotherapy order template:
1. Diagnosis
2. Treatment regimen name
3. Pre-treatment medications (name, dose, route, timing)
4. Chemotherapy medications (name, dose, route, infusion time)
5. Targeted therapy details
6. Cycle information

Format the response as JSON with this structure:
{{
    "diagnosis": "string",
    "regimen_name": "string",
    "phase1": {{
        "pretreatment": [{{
            "name": "string",
            "dose": "string",
            "route": "string",
            "timing": "string"
        }}],
        "chemotherapy": [{{
            "name": "string",
            "dose": "string",
            "route": "string",
            "infusion_time": "string"
        }}],
        "targeted_therapy": [{{
            "name": "string",
            "dosing": [{{
                "week": "string",
                "dose": "string",
                "route": "string",
                "infusion_time": "string"
            }}]
        }}]
    }}
}}

PDF Content:
{document_text}
"#
    )
}
