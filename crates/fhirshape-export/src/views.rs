//! Per-record-type presentation.
//!
//! A view names the fields worth showing for one record type and where in
//! the record each one lives. Values are read after projecting the record
//! onto a template built from the view's paths, so a record that lacks a
//! field renders the default instead of failing.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;

use fhirshape_core::path::FieldPath;
use fhirshape_core::project::{project, template_from_paths};
use fhirshape_core::tree::{Scalar, Tree};

use crate::error::ExportError;

/// Where one piece of a field's value comes from.
#[derive(Debug, Clone, Copy)]
pub enum Cell {
    /// A single value, read through projection.
    Path(&'static str),
    /// Every element of the array at the path, joined by the separator.
    Each(&'static str, &'static str),
    /// Base64 text at the path, decoded.
    Base64(&'static str),
}

/// One labelled line of a view.
#[derive(Debug, Clone, Copy)]
pub struct FieldView {
    pub label: &'static str,
    pub cells: &'static [Cell],
    pub separator: &'static str,
}

/// Everything shown for a record of one type.
#[derive(Debug, Clone, Copy)]
pub struct RecordView {
    pub type_name: &'static str,
    pub fields: &'static [FieldView],
    /// Also list every dotted field path of the record.
    pub list_paths: bool,
}

/// A rendered field, ready for the page template.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldRow {
    pub label: String,
    pub value: String,
}

const fn field(label: &'static str, cells: &'static [Cell]) -> FieldView {
    FieldView {
        label,
        cells,
        separator: " ",
    }
}

const fn joined(label: &'static str, cells: &'static [Cell], separator: &'static str) -> FieldView {
    FieldView {
        label,
        cells,
        separator,
    }
}

const STATUS: FieldView = field("Status", &[Cell::Path("status")]);
const CATEGORY: FieldView = field("Category", &[Cell::Path("category.0.coding.0.display")]);

pub const PATIENT: RecordView = RecordView {
    type_name: "Patient",
    fields: &[
        field("Name", &[Cell::Each("name.0.given", " "), Cell::Path("name.0.family")]),
        field("Gender", &[Cell::Path("gender")]),
        field("Birth Date", &[Cell::Path("birthDate")]),
        joined(
            "Address",
            &[
                Cell::Each("address.0.line", ", "),
                Cell::Path("address.0.city"),
                Cell::Path("address.0.state"),
                Cell::Path("address.0.postalCode"),
                Cell::Path("address.0.country"),
            ],
            ", ",
        ),
        field("Race", &[Cell::Path("extension.0.extension.1.valueString")]),
        field("Ethnicity", &[Cell::Path("extension.1.extension.1.valueString")]),
        field("Language", &[Cell::Path("communication.0.language.coding.0.display")]),
        field("Marital Status", &[Cell::Path("maritalStatus.text")]),
        field("Multiple Birth", &[Cell::Path("multipleBirthBoolean")]),
        field("Mothers Maiden Name", &[Cell::Path("extension.2.valueString")]),
        field("Phone", &[Cell::Path("telecom.0.value")]),
        field("Disability Adjusted Life Years", &[Cell::Path("extension.5.valueDecimal")]),
        field("Quality Adjusted Life Years", &[Cell::Path("extension.6.valueDecimal")]),
        field("Medical Record Number", &[Cell::Path("identifier.0.value")]),
        field("Assigned Sex at Birth", &[Cell::Path("extension.3.valueCode")]),
        joined(
            "Birthplace",
            &[
                Cell::Path("extension.4.valueAddress.city"),
                Cell::Path("extension.4.valueAddress.state"),
            ],
            ", ",
        ),
    ],
    list_paths: false,
};

pub const ENCOUNTER: RecordView = RecordView {
    type_name: "Encounter",
    fields: &[
        field("Type", &[Cell::Path("type.0.coding.0.display")]),
        joined(
            "Period",
            &[Cell::Path("period.start"), Cell::Path("period.end")],
            " - ",
        ),
        field("Location", &[Cell::Path("location.0.location.display")]),
        STATUS,
        field("Class", &[Cell::Path("class.code")]),
        field("Performer", &[Cell::Path("participant.0.individual.display")]),
        field("Service Provider", &[Cell::Path("serviceProvider.display")]),
    ],
    list_paths: false,
};

pub const CONDITION: RecordView = RecordView {
    type_name: "Condition",
    fields: &[
        field("Clinical Status", &[Cell::Path("clinicalStatus.coding.0.code")]),
        field("Verification Status", &[Cell::Path("verificationStatus.coding.0.code")]),
        CATEGORY,
        field("Diagnosis", &[Cell::Path("code.coding.0.display")]),
        field("Code", &[Cell::Path("code.coding.0.code")]),
        field("Onset Date", &[Cell::Path("onsetDateTime")]),
        field("Abatement Date", &[Cell::Path("abatementDateTime")]),
        field("Recorded Date", &[Cell::Path("recordedDate")]),
    ],
    list_paths: true,
};

pub const OBSERVATION: RecordView = RecordView {
    type_name: "Observation",
    fields: &[
        STATUS,
        CATEGORY,
        field("Code", &[Cell::Path("code.coding.0.display")]),
        field("Effective Date", &[Cell::Path("effectiveDateTime")]),
    ],
    list_paths: true,
};

pub const IMMUNIZATION: RecordView = RecordView {
    type_name: "Immunization",
    fields: &[
        STATUS,
        field("Vaccine Code", &[Cell::Path("vaccineCode.coding.0.display")]),
        field("Occurrence Date", &[Cell::Path("occurrenceDateTime")]),
        field("Primary Source", &[Cell::Path("primarySource")]),
        field("Vaccinating Clinic", &[Cell::Path("location.display")]),
    ],
    list_paths: true,
};

pub const DIAGNOSTIC_REPORT: RecordView = RecordView {
    type_name: "DiagnosticReport",
    fields: &[
        STATUS,
        CATEGORY,
        field("Code", &[Cell::Path("code.coding.0.display")]),
        field("Effective Date", &[Cell::Path("effectiveDateTime")]),
    ],
    list_paths: true,
};

pub const DOCUMENT_REFERENCE: RecordView = RecordView {
    type_name: "DocumentReference",
    fields: &[
        STATUS,
        field("Type", &[Cell::Path("type.coding.0.display")]),
        field("Date", &[Cell::Path("date")]),
        field("Data", &[Cell::Base64("content.0.attachment.data")]),
    ],
    list_paths: true,
};

pub const MEDICATION_REQUEST: RecordView = RecordView {
    type_name: "MedicationRequest",
    fields: &[
        STATUS,
        field("Intent", &[Cell::Path("intent")]),
        field("Medication", &[Cell::Path("medicationCodeableConcept.text")]),
        field("Medication Code", &[Cell::Path("medicationCodeableConcept.coding.0.code")]),
        field("Dosage Instructions", &[Cell::Path("dosageInstruction.0.text")]),
        field("As Needed?", &[Cell::Path("dosageInstruction.0.asNeededBoolean")]),
        field("Authored Date", &[Cell::Path("authoredOn")]),
        field("Requester", &[Cell::Path("requester.display")]),
        CATEGORY,
    ],
    list_paths: true,
};

pub const PROCEDURE: RecordView = RecordView {
    type_name: "Procedure",
    fields: &[
        STATUS,
        field("Procedure", &[Cell::Path("code.coding.0.display")]),
        field("Procedure Code", &[Cell::Path("code.coding.0.code")]),
        joined(
            "Performed Period",
            &[
                Cell::Path("performedPeriod.start"),
                Cell::Path("performedPeriod.end"),
            ],
            " - ",
        ),
        field("Performed At Location", &[Cell::Path("location.display")]),
        field("Reason", &[Cell::Path("reasonReference.0.display")]),
    ],
    list_paths: true,
};

/// Header and raw JSON only.
pub const GENERIC: RecordView = RecordView {
    type_name: "*",
    fields: &[],
    list_paths: false,
};

/// Summary shown at the top of the page, read from the leading Patient.
pub const PATIENT_SUMMARY: RecordView = RecordView {
    type_name: "Patient",
    fields: &[
        field("Name", &[Cell::Each("name.0.given", " "), Cell::Path("name.0.family")]),
        field("Gender", &[Cell::Path("gender")]),
        field("Birth Date", &[Cell::Path("birthDate")]),
        field("Address", &[Cell::Path("address.0.city")]),
    ],
    list_paths: false,
};

pub const ALL_VIEWS: &[RecordView] = &[
    PATIENT,
    ENCOUNTER,
    CONDITION,
    OBSERVATION,
    IMMUNIZATION,
    DIAGNOSTIC_REPORT,
    DOCUMENT_REFERENCE,
    MEDICATION_REQUEST,
    PROCEDURE,
];

/// The view for a record type, falling back to [`GENERIC`].
pub fn view_for(type_name: &str) -> &'static RecordView {
    ALL_VIEWS
        .iter()
        .find(|v| v.type_name == type_name)
        .unwrap_or(&GENERIC)
}

impl RecordView {
    /// Template covering every projected path of this view.
    pub fn template(&self) -> Result<Tree, ExportError> {
        let paths = self
            .fields
            .iter()
            .flat_map(|f| f.cells.iter())
            .filter_map(|cell| match cell {
                Cell::Path(p) => Some(*p),
                Cell::Each(..) | Cell::Base64(_) => None,
            })
            .map(|p| self.parse(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(template_from_paths(&paths, &Scalar::Null))
    }

    /// Render every field of the view for `record`.
    ///
    /// `record` of `None` renders every field as `default`.
    pub fn rows(&self, record: Option<&Tree>, default: &str) -> Result<Vec<FieldRow>, ExportError> {
        let template = self.template()?;
        let projected = project(&template, record, &Scalar::string(default));

        self.fields
            .iter()
            .map(|f| {
                let parts = f
                    .cells
                    .iter()
                    .map(|cell| self.cell_text(cell, &projected, record, default))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(FieldRow {
                    label: f.label.to_string(),
                    value: parts.join(f.separator),
                })
            })
            .collect()
    }

    fn cell_text(
        &self,
        cell: &Cell,
        projected: &Tree,
        record: Option<&Tree>,
        default: &str,
    ) -> Result<String, ExportError> {
        let text = match cell {
            Cell::Path(p) => projected
                .at_path(&self.parse(p)?)
                .map(Tree::display_text)
                .unwrap_or_else(|| default.to_string()),
            Cell::Each(p, sep) => {
                let path = self.parse(p)?;
                match record.and_then(|r| r.at_path(&path)) {
                    Some(Tree::Array(items)) => items
                        .iter()
                        .map(Tree::display_text)
                        .collect::<Vec<_>>()
                        .join(*sep),
                    Some(other) => other.display_text(),
                    None => default.to_string(),
                }
            }
            Cell::Base64(p) => {
                let path = self.parse(p)?;
                match record.and_then(|r| r.at_path(&path)).and_then(Tree::as_str) {
                    Some(encoded) => decode_attachment(encoded).unwrap_or_else(|| default.to_string()),
                    None => default.to_string(),
                }
            }
        };
        Ok(text)
    }

    fn parse(&self, path: &str) -> Result<FieldPath, ExportError> {
        FieldPath::parse(path).map_err(|e| ExportError::View {
            type_name: self.type_name.to_string(),
            reason: e.to_string(),
        })
    }
}

fn decode_attachment(encoded: &str) -> Option<String> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    match STANDARD.decode(compact) {
        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Err(e) => {
            tracing::warn!(error = %e, "attachment is not valid base64");
            None
        }
    }
}
