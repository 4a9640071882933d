use serde::{Deserialize, Serialize};

/// Page styling for rendered documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PageStyles {
    /// CSS font stack for the whole page.
    pub font_family: String,

    /// Width of the main container as a percentage of the viewport.
    pub container_width_percent: u8,

    /// Border colour of entry boxes.
    pub border_color: String,
}

impl Default for PageStyles {
    fn default() -> Self {
        Self {
            font_family: "Arial, sans-serif".to_string(),
            container_width_percent: 90,
            border_color: "#ccc".to_string(),
        }
    }
}

impl PageStyles {
    /// Stylesheet for the page `<style>` block.
    pub fn css(&self) -> String {
        let width = self.container_width_percent.clamp(10, 100);
        format!(
            "body {{ font-family: {font}; }}\n\
             .container {{ width: {width}%; margin: auto; padding: 20px; border: 1px solid #ddd; }}\n\
             h1 {{ text-align: center; }}\n\
             .info {{ margin-bottom: 20px; }}\n\
             .info span {{ font-weight: bold; }}\n\
             .fields {{ margin-top: 40px; }}\n\
             .outerresource, .resource {{ border: 1px solid {border}; padding: 3px; margin: 3px 0; }}\n\
             .resource {{ cursor: pointer; }}\n\
             .resource h3 {{ margin-top: 0; }}\n\
             .content {{ display: none; overflow: hidden; }}\n\
             .content .value {{ white-space: pre-wrap; }}\n",
            font = self.font_family,
            border = self.border_color,
        )
    }
}
