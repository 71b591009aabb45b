pub const NARRATIVE_SYSTEM: &str = "You are a career strategist for senior technology leaders. \
    You turn job-market data into concise, practical advice. \
    You MUST respond with valid JSON only, no markdown.";

pub const NARRATIVE_PROMPT_TEMPLATE: &str = r#"Below is a summary of a job search and the market it found.

Return exactly this JSON shape:
{"summary": "<three sentences at most>", "recommendations": ["<short actionable item>", ...]}
Give at most 5 recommendations. Base every statement on the data provided.

SEARCH:
{criteria}

MARKET:
{market}

TOP MATCHES:
{top_matches}

CANDIDATE PROFILE:
{profile}"#;
