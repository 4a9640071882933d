use serde::{Deserialize, Serialize};
use tera::{Context, Tera};

use fhirshape_core::options::defaults;
use fhirshape_core::path::field_paths;
use fhirshape_core::tree::Tree;

use crate::error::ExportError;
use crate::styles::PageStyles;
use crate::views::{FieldRow, PATIENT_SUMMARY, view_for};

const PAGE_TEMPLATE_NAME: &str = "document.html";

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>{{ title }}</title>
    <style>
{{ css | safe }}
    </style>
</head>
<body>
    <div class="container">
        <h1>{{ heading }}</h1>
        {% for row in summary %}<div class="info"><span>{{ row.label }}:</span> {{ row.value }}</div>
        {% endfor %}
        <div class="fields">
            <h2>Events</h2>
            {% for entry in entries %}<div class="outerresource">
                <div class="resource"><h3>{{ entry.type_name }}</h3><p><i>{{ entry.id }}</i></p></div>
                <div class="content">
                    {% for row in entry.fields %}<p><strong>{{ row.label }}:</strong> <span class="value">{{ row.value }}</span></p>
                    {% endfor %}<textarea rows="4" cols="50">{{ entry.json }}</textarea>
                    {% if entry.paths %}<p class="paths">{% for path in entry.paths %}{{ path }}<br>{% endfor %}</p>{% endif %}
                </div>
            </div>
            {% endfor %}
        </div>
    </div>
    <script>
        function toggleContent() {
            const content = this.nextElementSibling;
            content.style.display = content.style.display === 'block' ? 'none' : 'block';
        }
        document.querySelectorAll('.resource').forEach(el => el.addEventListener('click', toggleContent));
    </script>
</body>
</html>
"#;

/// Knobs for [`render_document`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Browser title of the page.
    pub title: String,

    /// Heading above the patient summary.
    pub heading: String,

    /// Record types left out of the page.
    pub hidden_types: Vec<String>,

    /// Text shown for fields a record does not have.
    pub default_value: String,

    /// Field naming each record's type.
    pub discriminant: String,

    pub styles: PageStyles,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            title: "FHIR Document".to_string(),
            heading: "Patient Information".to_string(),
            hidden_types: Vec::new(),
            default_value: "N/A".to_string(),
            discriminant: defaults::DISCRIMINANT.to_string(),
            styles: PageStyles::default(),
        }
    }
}

/// One entry of the page, as handed to the template.
#[derive(Debug, Clone, Serialize)]
pub struct EntrySection {
    pub type_name: String,
    pub id: String,
    pub fields: Vec<FieldRow>,
    pub json: String,
    pub paths: Vec<String>,
}

#[derive(Serialize)]
struct Page<'a> {
    title: &'a str,
    heading: &'a str,
    css: String,
    summary: Vec<FieldRow>,
    entries: Vec<EntrySection>,
}

/// Render a bundle document as a standalone HTML page.
pub fn render_document(document: &Tree, options: &RenderOptions) -> Result<String, ExportError> {
    let entries = document
        .get(defaults::ENTRY_FIELD)
        .and_then(Tree::as_array)
        .ok_or_else(|| {
            ExportError::NotABundle(format!("no '{}' array", defaults::ENTRY_FIELD))
        })?;

    let summary = patient_summary(entries, options)?;
    let sections = entry_sections(entries, options)?;
    tracing::debug!(entries = entries.len(), rendered = sections.len(), "rendering document");

    let page = Page {
        title: &options.title,
        heading: &options.heading,
        css: options.styles.css(),
        summary,
        entries: sections,
    };

    let mut tera = Tera::default();
    tera.add_raw_template(PAGE_TEMPLATE_NAME, PAGE_TEMPLATE)
        .map_err(|e| ExportError::TemplateParse(e.to_string()))?;
    let context = Context::from_serialize(&page)?;

    Ok(tera.render(PAGE_TEMPLATE_NAME, &context)?)
}

/// Name, gender, birth date and city of the leading Patient entry.
pub fn patient_summary(entries: &[Tree], options: &RenderOptions) -> Result<Vec<FieldRow>, ExportError> {
    let patient = entries
        .first()
        .and_then(|entry| entry.get(defaults::RESOURCE_FIELD))
        .filter(|resource| {
            resource.get(&options.discriminant).and_then(Tree::as_str) == Some("Patient")
        });
    PATIENT_SUMMARY.rows(patient, &options.default_value)
}

/// Sections for every visible entry, in document order.
///
/// Entries that do not wrap a resource are skipped.
pub fn entry_sections(entries: &[Tree], options: &RenderOptions) -> Result<Vec<EntrySection>, ExportError> {
    let mut sections = Vec::with_capacity(entries.len());

    for (index, entry) in entries.iter().enumerate() {
        let Some(resource) = entry.get(defaults::RESOURCE_FIELD) else {
            tracing::warn!(index, "entry has no resource, not rendered");
            continue;
        };

        let type_name = resource
            .get(&options.discriminant)
            .and_then(Tree::as_str)
            .unwrap_or("Unknown");
        if options.hidden_types.iter().any(|t| t == type_name) {
            continue;
        }

        let view = view_for(type_name);
        let id = resource
            .get("id")
            .map(Tree::display_text)
            .unwrap_or_else(|| options.default_value.clone());
        let paths = if view.list_paths {
            field_paths(resource)
        } else {
            Vec::new()
        };

        sections.push(EntrySection {
            type_name: type_name.to_string(),
            id,
            fields: view.rows(Some(resource), &options.default_value)?,
            json: serde_json::to_string_pretty(entry)?,
            paths,
        });
    }

    Ok(sections)
}
