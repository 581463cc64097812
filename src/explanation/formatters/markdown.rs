use crate::cf::NutrientEvaluation;
use crate::explanation::types::{DiagnosisReport, Outcome};
use crate::utils::normalization::InputAnomaly;

/// Markdown formatter for diagnosis reports
pub struct MarkdownFormatter;

impl MarkdownFormatter {
    /// Format report as markdown, including the full calculation trail
    pub fn format(report: &DiagnosisReport) -> String {
        let mut md = String::with_capacity(2048);

        // Title
        match &report.top {
            Some(top) => {
                md.push_str(&format!("# Diagnosis: {}\n\n", top.name));
                md.push_str(&format!(
                    "**Certainty factor:** {:.4} ({:.2}%) - {}\n\n",
                    top.cf,
                    top.cf_percentage,
                    top.level.label()
                ));
            }
            None => md.push_str("# Diagnosis\n\n"),
        }
        md.push_str(&format!("{}\n\n", report.message));

        if let Some(top) = &report.top {
            md.push_str("## Recommended Treatment\n\n");
            md.push_str(&format!("{}\n\n", top.solution));
        }

        // Selected symptoms
        if !report.symptoms_selected.is_empty() {
            md.push_str("## Selected Symptoms\n\n");
            md.push_str("| Code | Symptom | Category | CF User |\n");
            md.push_str("|------|---------|----------|---------|\n");
            for symptom in &report.symptoms_selected {
                md.push_str(&format!(
                    "| {} | {} | {} | {:.2} |\n",
                    symptom.code, symptom.name, symptom.category, symptom.cf_user
                ));
            }
            md.push('\n');
        }

        // Input notes
        if !report.anomalies.is_empty() {
            md.push_str("## Input Notes\n\n");
            for anomaly in &report.anomalies {
                md.push_str(&format!("- {}\n", Self::describe_anomaly(anomaly)));
            }
            md.push('\n');
        }

        if report.outcome != Outcome::Diagnosed {
            return md;
        }

        // Ranking
        md.push_str("## Ranking\n\n");
        md.push_str("| Rank | Nutrient | CF | Percentage |\n");
        md.push_str("|------|----------|----|------------|\n");
        for (idx, nutrient) in report.ranking.iter().enumerate() {
            md.push_str(&format!(
                "| {} | {} - {} | {:.4} | {:.2}% |\n",
                idx + 1,
                nutrient.code,
                nutrient.name,
                nutrient.cf,
                nutrient.cf_percentage
            ));
        }
        md.push('\n');

        // Calculation trail
        md.push_str("## Calculation Details\n\n");
        for detail in report.details_with_evidence() {
            Self::format_detail(&mut md, detail);
        }

        md
    }

    fn describe_anomaly(anomaly: &InputAnomaly) -> String {
        match anomaly {
            InputAnomaly::UnknownSymptom { code } => {
                format!("{}: unknown symptom code, ignored", code)
            }
            InputAnomaly::NonNumeric { code, value } => {
                format!("{}: confidence {} is not a number, ignored", code, value)
            }
            InputAnomaly::Clamped {
                code,
                original,
                clamped,
            } => format!("{}: confidence {} clamped to {}", code, original, clamped),
        }
    }

    fn format_detail(md: &mut String, detail: &NutrientEvaluation) {
        md.push_str(&format!(
            "### {} - {}\n\n",
            detail.nutrient_code, detail.nutrient_name
        ));

        md.push_str("| Symptom | CF Expert | CF User | CF Rule |\n");
        md.push_str("|---------|-----------|---------|---------|\n");
        for rule in &detail.rules_used {
            md.push_str(&format!(
                "| {} - {} | {:.4} | {:.4} | {:.4} |\n",
                rule.symptom_code, rule.symptom_name, rule.cf_pakar, rule.cf_user, rule.cf_rule
            ));
        }
        md.push('\n');

        if !detail.combination_steps.is_empty() {
            md.push_str("**Combination:**\n\n");
            for step in &detail.combination_steps {
                md.push_str(&format!(
                    "{}. {} = {:.4}\n",
                    step.step, step.calculation, step.result
                ));
            }
            md.push('\n');
        }

        md.push_str(&format!(
            "**Final CF:** {:.4} ({:.2}%)\n\n",
            detail.cf_final, detail.cf_percentage
        ));
    }
}
