use crate::domain::UserType;
use crate::energy::{metrics::fmt_opt, EnergyMetrics, MetricThresholds};

use super::RecommendError;

const BASIC_SUGGESTION: &str = "Basic suggestion: Given the projected climate conditions, \
consider optimizing climate control usage during peak hours.";

fn audience_focus(user_type: UserType) -> &'static str {
    match user_type {
        UserType::Home => {
            "Focus on practical actions for families:\n\
             - Efficient use of air conditioning and fans\n\
             - Taking advantage of natural light and ventilation\n\
             - Consideration of residential solar panels\n\
             - Adjusting appliance usage schedules"
        }
        UserType::Industry => {
            "Focus on industrial optimization:\n\
             - Load shifting to off-peak hours\n\
             - Predictive maintenance of HVAC systems\n\
             - Cogeneration and energy storage\n\
             - Zone-based climate control automation"
        }
    }
}

/// Prompt asking for exactly one data-backed energy saving suggestion.
pub fn build_prompt(
    metrics: &EnergyMetrics,
    thresholds: &MetricThresholds,
    user_type: UserType,
    zone_name: &str,
    days: u32,
) -> String {
    format!(
        "You are a certified energy advisor. Analyze this climate data for {zone} for the next {days} days \
and generate ONE energy saving suggestion.

**USER TYPE:** {user}
**ZONE:** {zone}
**PERIOD:** {days} days

**CLIMATE DATA:**
- Average temperature: {avg_temp}°C
- Maximum expected temperature: {max_temp}°C
- Extreme heat days (>{extreme}°C): {extreme_days}
- Cooling degree days (CDD, base {cdd_base}°C): {cdd:.1}
- Average solar radiation: {radiation} MJ/m²
- Effective solar potential: {potential} MJ/m²
- Optimal solar days: {solar_days}
- High demand days: {demand_days}
- Average relative humidity: {humidity}%

{focus}

**RESPONSE FORMAT (STRICTLY):**

### [Impactful Suggestion Title]

**Analysis:**
[2-3 sentences linking climate data to specific energy impact]

**Recommended Action:**
[Clear and specific description of WHAT to do and HOW to implement it]

**Estimated Savings:**
[Approximate percentage or amount in USD, with justification based on data]

**Priority:** [High/Medium/Low based on impact vs effort]

---
IMPORTANT:
- Maximum 200 words total
- Use the numerical data provided
- Be specific with measurable actions
- Don't invent data I didn't give you
",
        zone = zone_name,
        days = days,
        user = user_type.to_string().to_uppercase(),
        avg_temp = fmt_opt(metrics.avg_temp),
        max_temp = fmt_opt(metrics.max_temp),
        extreme = thresholds.extreme_heat_c,
        extreme_days = metrics.extreme_heat_days,
        cdd_base = thresholds.cdd_base_c,
        cdd = metrics.cdd_total,
        radiation = fmt_opt(metrics.avg_radiation),
        potential = fmt_opt(metrics.avg_solar_potential),
        solar_days = metrics.optimal_solar_days,
        demand_days = metrics.high_demand_days,
        humidity = fmt_opt(metrics.avg_humidity),
        focus = audience_focus(user_type),
    )
}

pub fn fallback_suggestion(error: &RecommendError) -> String {
    format!("⚠️ Error generating suggestion: {error}\n\n{BASIC_SUGGESTION}")
}
