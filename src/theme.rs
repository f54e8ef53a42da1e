use serde::{Deserialize, Serialize};

use crate::ir::Gender;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub male_fill: String,
    pub female_fill: String,
    pub unknown_fill: String,
    pub node_border: String,
    pub text_color: String,
    pub line_color: String,
    pub first_marriage_color: String,
    pub later_marriage_color: String,
    pub later_marriage_dasharray: String,
    pub consanguineous_color: String,
    pub background: String,
}

impl Theme {
    pub fn classic() -> Self {
        Self {
            font_family: "\"trebuchet ms\", verdana, arial, sans-serif".to_string(),
            font_size: 14.0,
            male_fill: "#DCEBFF".to_string(),
            female_fill: "#FFE1EC".to_string(),
            unknown_fill: "#EEEEEE".to_string(),
            node_border: "#666666".to_string(),
            text_color: "#222222".to_string(),
            line_color: "#555555".to_string(),
            first_marriage_color: "#C2185B".to_string(),
            later_marriage_color: "#7B1FA2".to_string(),
            later_marriage_dasharray: "6 4".to_string(),
            consanguineous_color: "#E65100".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            male_fill: "#EEF4FF".to_string(),
            female_fill: "#FFF1F5".to_string(),
            unknown_fill: "#F5F6F8".to_string(),
            node_border: "#C7D2E5".to_string(),
            text_color: "#1C2430".to_string(),
            line_color: "#7A8AA6".to_string(),
            first_marriage_color: "#D6336C".to_string(),
            later_marriage_color: "#9C6ADE".to_string(),
            later_marriage_dasharray: "5 4".to_string(),
            consanguineous_color: "#F08C00".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }

    pub fn fill_for(&self, gender: Gender) -> &str {
        match gender {
            Gender::Male => &self.male_fill,
            Gender::Female => &self.female_fill,
            Gender::Unknown => &self.unknown_fill,
        }
    }
}
