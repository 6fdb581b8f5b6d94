//! Prompt construction for the completion-backed tagger

use super::KnownService;

/// System instructions given to the analyst agent
pub const PREAMBLE: &str = "You are an expert in identifying services provided by CRO \
(Contract Research Organization) companies in the life sciences industry. \
Your task is to analyze the scraped website data from a company's website and identify \
which services they likely provide. \
CROs offer a wide range of services to pharmaceutical, biotechnology, and medical device \
companies. These services often include clinical trial management, data management, \
regulatory affairs support, and various laboratory services.";

const INSTRUCTIONS: &str = r#"Instructions:
1. Carefully analyze the scraped website data.
2. Identify services that the company likely provides, but ONLY from the given list of services. List these under "provided_services".
3. If you identify services that seem to be offered but are NOT in the given list, include them under "additional_services".
4. Assign a confidence score (0-100) to each identified service.
5. Ignore any non-service related content (e.g., contact information, company history).
6. If the website content is not related to CRO or scientific services, return "N/A" for all fields."#;

const FORMAT_INSTRUCTIONS: &str = r#"Respond with a single JSON object of this shape and nothing else:
{
  "provided_services": ["<service name from the list>"],
  "additional_services": ["<service name not in the list>"],
  "confidence_scores": {"<service name>": <number 0-100>}
}
Please ensure the response is JSON parsable and remove any HTML tags or markdown formatting."#;

/// Build the user prompt for a corpus and the known service list
pub fn build_prompt(corpus: &str, known_services: &[KnownService]) -> String {
    let services_list = known_services
        .iter()
        .map(|service| format!("{}: {}", service.name, service.description))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Scraped website data:\n{}\n\nList of possible services and their descriptions:\n{}\n\n{}\n\n{}\n",
        corpus.trim(),
        services_list,
        INSTRUCTIONS,
        FORMAT_INSTRUCTIONS
    )
}

/// Remove a surrounding markdown code fence from a model response
pub fn strip_code_fences(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string, e.g. ```json
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}
