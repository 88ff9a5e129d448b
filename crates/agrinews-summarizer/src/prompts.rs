//! Instruction templates sent ahead of the raw input.

/// Article body → farmer-facing insight paragraph.
pub const ARTICLE_INSIGHT: &str = "You are an agricultural extension officer writing for \
Filipino farmers. Summarize the news article below into one short paragraph of at most \
four sentences that explains what it means for farmers. Do not use bullet points, \
headings or Markdown. Start directly with the insight; do not add an introduction.";

/// Recent care logs → growth optimization steps.
pub const WEEKLY_SUGGESTION: &str = "You are a plant expert. Given the care log data below, \
list suggestions to optimize plant growth. Give only the action steps and skip the \
explanations. Use bullet points, keep each bullet to at most 10 words, and do not add \
filler sentences such as \"Here is a step-by-step plan to optimize growth\".";

/// Recent news → crop price outlook as strict JSON.
pub const DEMAND_FORECAST: &str = "Based on the news reports below, list the crops likely \
to increase in price and the crops likely to decrease in price. Respond with JSON only and \
no introduction. Use the key \"increasing\" for crops rising in price and \"decreasing\" for \
crops falling in price; each is an array of objects with the keys \"crop\" (crop name), \
\"price\" (current estimated price in Philippine pesos as a float, not a predicted price, \
and not limited to figures in the reports) and \"analysis\" (why the price is expected to \
move). Leave out crops with a neutral outlook and do not mention news ids.";

/// Joins an instruction template and its input.
#[must_use]
pub fn compose(template: &str, input: &str) -> String {
    format!("{template}\n\n{input}")
}
