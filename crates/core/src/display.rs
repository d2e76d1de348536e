//! Text display collaborator for vertex count, area and warnings

use crate::area::{format_area, DEFAULT_AREA_DECIMALS};

/// Status display updated by the session
pub trait DisplayPanel {
    /// Show the number of placed vertices
    fn set_vertex_count(&mut self, count: usize);

    /// Show the last computed area (0.0 after a reset)
    fn set_area(&mut self, area: f64);

    /// Surface a blocking warning to the user
    fn alert(&mut self, message: &str);
}

/// String-backed display panel
#[derive(Debug, Clone)]
pub struct TextPanel {
    decimals: usize,
    vertex_text: String,
    area_text: String,
    alerts: Vec<String>,
}

impl TextPanel {
    pub fn new() -> Self {
        Self::with_decimals(DEFAULT_AREA_DECIMALS)
    }

    pub fn with_decimals(decimals: usize) -> Self {
        Self {
            decimals,
            vertex_text: vertex_label(0),
            area_text: format_area(0.0, decimals),
            alerts: Vec::new(),
        }
    }

    pub fn vertex_text(&self) -> &str {
        &self.vertex_text
    }

    pub fn area_text(&self) -> &str {
        &self.area_text
    }

    /// Warnings raised so far, oldest first
    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }
}

impl Default for TextPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayPanel for TextPanel {
    fn set_vertex_count(&mut self, count: usize) {
        self.vertex_text = vertex_label(count);
    }

    fn set_area(&mut self, area: f64) {
        self.area_text = format_area(area, self.decimals);
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_owned());
    }
}

fn vertex_label(count: usize) -> String {
    format!("Vertices: {count}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_text() {
        let panel = TextPanel::new();
        assert_eq!(panel.vertex_text(), "Vertices: 0");
        assert_eq!(panel.area_text(), "0.00");
        assert!(panel.alerts().is_empty());
    }

    #[test]
    fn test_updates() {
        let mut panel = TextPanel::with_decimals(1);
        panel.set_vertex_count(5);
        panel.set_area(10.26);
        panel.alert("careful");

        assert_eq!(panel.vertex_text(), "Vertices: 5");
        assert_eq!(panel.area_text(), "10.3");
        assert_eq!(panel.alerts(), &["careful".to_owned()]);
    }

    #[test]
    fn test_area_tie_rounds_up() {
        let mut panel = TextPanel::new();
        panel.set_area(0.125);
        assert_eq!(panel.area_text(), "0.13");
    }
}
