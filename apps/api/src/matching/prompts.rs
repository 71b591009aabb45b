pub const SEMANTIC_SYSTEM: &str = "You are an experienced executive recruiter. \
    You assess how well a candidate fits a job posting. \
    You MUST respond with valid JSON only, no markdown.";

pub const SEMANTIC_PROMPT_TEMPLATE: &str = r#"Assess the candidate's fit for the job below.

Return exactly this JSON shape:
{"score": <number between 0 and 1, or one of "High", "Medium", "Low">, "rationale": "<two sentences at most>"}

{untrusted_instruction}

JOB TITLE: {title}
COMPANY: {company}
LOCATION: {location}
DESCRIPTION:
{description}

CANDIDATE PROFILE:
{profile}"#;
