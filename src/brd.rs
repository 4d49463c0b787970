//! Business Requirements Document rendering.
//!
//! The layout is fixed: a title line, a generation stamp, then six sections
//! in a fixed order. Missing answers render as `N/A`.

use chrono::{ Local, NaiveDateTime };
use serde::{ Deserialize, Serialize };
use std::collections::HashMap;

pub const PLACEHOLDER: &str = "N/A";
pub const TITLE_KEY: &str = "project_name";
pub const DEFAULT_TITLE: &str = "Unnamed Project";
const GENERATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Field key → answer text.
pub type Answers = HashMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrdSection {
    Overview,
    Objectives,
    Stakeholders,
    Kpis,
    SuccessCriteria,
    Risks,
}

impl BrdSection {
    pub const ALL: [BrdSection; 6] = [
        BrdSection::Overview,
        BrdSection::Objectives,
        BrdSection::Stakeholders,
        BrdSection::Kpis,
        BrdSection::SuccessCriteria,
        BrdSection::Risks,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            BrdSection::Overview => "project_overview",
            BrdSection::Objectives => "objectives",
            BrdSection::Stakeholders => "stakeholders",
            BrdSection::Kpis => "kpis",
            BrdSection::SuccessCriteria => "success_criteria",
            BrdSection::Risks => "risks",
        }
    }

    pub fn heading(&self) -> &'static str {
        match self {
            BrdSection::Overview => "## 🧭 Project Overview",
            BrdSection::Objectives => "## 🎯 Objectives",
            BrdSection::Stakeholders => "## 👥 Stakeholders",
            BrdSection::Kpis => "## 📊 KPIs",
            BrdSection::SuccessCriteria => "## 📈 Success Criteria",
            BrdSection::Risks => "## ⚠️ Risks and Constraints",
        }
    }
}

pub fn render(answers: &Answers) -> String {
    render_at(answers, Local::now().naive_local())
}

pub fn render_at(answers: &Answers, generated_at: NaiveDateTime) -> String {
    let title = answers.get(TITLE_KEY).map(String::as_str).unwrap_or(DEFAULT_TITLE);
    let mut out = format!(
        "# 📄 BRD: {}\n*Generated on {}*\n\n",
        title,
        generated_at.format(GENERATED_AT_FORMAT)
    );
    for section in BrdSection::ALL {
        let body = answers.get(section.key()).map(String::as_str).unwrap_or(PLACEHOLDER);
        out.push_str(section.heading());
        out.push('\n');
        out.push_str(body);
        out.push_str("\n\n");
    }
    out
}

/// The BRD form as submitted by a user. Blank fields count as omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrdForm {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub project_overview: Option<String>,
    #[serde(default)]
    pub objectives: Option<String>,
    #[serde(default)]
    pub stakeholders: Option<String>,
    #[serde(default)]
    pub kpis: Option<String>,
    #[serde(default)]
    pub success_criteria: Option<String>,
    #[serde(default)]
    pub risks: Option<String>,
}

impl BrdForm {
    fn field(&self, section: BrdSection) -> Option<&String> {
        match section {
            BrdSection::Overview => self.project_overview.as_ref(),
            BrdSection::Objectives => self.objectives.as_ref(),
            BrdSection::Stakeholders => self.stakeholders.as_ref(),
            BrdSection::Kpis => self.kpis.as_ref(),
            BrdSection::SuccessCriteria => self.success_criteria.as_ref(),
            BrdSection::Risks => self.risks.as_ref(),
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.trim().is_empty())
    }

    /// Builds the answer map; an omitted KPI field falls back to
    /// `default_kpis` joined with `", "` when that list is non-empty.
    pub fn to_answers(&self, default_kpis: &[String]) -> Answers {
        let mut answers = Answers::new();
        if let Some(title) = self.title() {
            answers.insert(TITLE_KEY.to_string(), title.to_string());
        }
        for section in BrdSection::ALL {
            if let Some(value) = self.field(section).filter(|v| !v.trim().is_empty()) {
                answers.insert(section.key().to_string(), value.clone());
            }
        }
        if !answers.contains_key(BrdSection::Kpis.key()) && !default_kpis.is_empty() {
            answers.insert(BrdSection::Kpis.key().to_string(), default_kpis.join(", "));
        }
        answers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn stamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(3, 4, 5).unwrap()
    }

    #[test]
    fn empty_answers_render_exact_template() {
        let expected = "# 📄 BRD: Unnamed Project\n*Generated on 2024-01-02 03:04:05*\n\n\
            ## 🧭 Project Overview\nN/A\n\n\
            ## 🎯 Objectives\nN/A\n\n\
            ## 👥 Stakeholders\nN/A\n\n\
            ## 📊 KPIs\nN/A\n\n\
            ## 📈 Success Criteria\nN/A\n\n\
            ## ⚠️ Risks and Constraints\nN/A\n\n";
        assert_eq!(render_at(&Answers::new(), stamp()), expected);
    }

    #[test]
    fn form_drops_blank_fields_and_applies_default_kpis() {
        let form = BrdForm {
            title: Some("  ".into()),
            objectives: Some("Cut churn".into()),
            risks: Some("\n".into()),
            ..Default::default()
        };
        let answers = form.to_answers(&["Revenue".to_string(), "Retention".to_string()]);
        assert_eq!(answers.get("objectives").map(String::as_str), Some("Cut churn"));
        assert_eq!(answers.get("kpis").map(String::as_str), Some("Revenue, Retention"));
        assert!(!answers.contains_key("risks"));
        assert!(!answers.contains_key(TITLE_KEY));
    }

    #[test]
    fn explicit_kpis_win_over_defaults() {
        let form = BrdForm { kpis: Some("NPS".into()), ..Default::default() };
        let answers = form.to_answers(&["Revenue".to_string()]);
        assert_eq!(answers.get("kpis").map(String::as_str), Some("NPS"));
    }
}
