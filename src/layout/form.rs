//! Attestation form sheet.
//!
//! Maps a paginated [`Document`] onto the fixed postal form: header boxes for
//! the parties, labelled grid rows, and a footer whose page count comes from
//! the document. Copy counts, fees and registry numbers are filled in by hand
//! at the post office, so they are always emitted blank.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::grid::{Document, Row};

pub const FORM_TITLE: &str = "郵 局 存 證 信 函 用 紙";

const CHINESE_NUMERALS: [&str; 10] = ["一", "二", "三", "四", "五", "六", "七", "八", "九", "十"];

/// Name and address printed in a header box.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Party {
    #[serde(default)]
    #[schema(example = "王小明")]
    pub name: String,
    #[serde(default)]
    #[schema(example = "臺北市中正區忠孝西路一段1號")]
    pub address: String,
}

impl Party {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }
}

/// Header section of every page.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormHeader {
    pub sender: Party,
    pub receiver: Party,
    /// Carbon-copy recipient, left for the sender to fill in.
    pub cc_recipient: Party,
    /// Assigned by the post office.
    pub registry_number: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FormRow {
    /// Row label in Chinese numerals, e.g. "一".
    pub label: String,
    pub cells: Vec<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FormPage {
    /// 1-based page number.
    pub number: usize,
    /// Page caption, e.g. "第 1 頁".
    pub caption: String,
    pub rows: Vec<FormRow>,
}

/// One line of the copy/fee table. Both values stay blank.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FeeLine {
    pub label: String,
    pub copies: Option<u32>,
    pub fee: Option<u32>,
}

impl FeeLine {
    fn blank(label: &str) -> Self {
        Self {
            label: label.to_string(),
            copies: None,
            fee: None,
        }
    }
}

/// Corrections box: "page _ row _ cell _, altered/added/deleted _ characters".
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CorrectionNote {
    pub page: Option<u32>,
    pub row: Option<u32>,
    pub cell: Option<u32>,
    pub characters: Option<u32>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormFooter {
    pub page_count: usize,
    pub fees: Vec<FeeLine>,
    pub total_fee: Option<u32>,
    pub correction: CorrectionNote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SealKind {
    SenderSeal,
    CorrectionSeal,
    Postmark,
    SeamPostmark,
    PostageStamp,
}

/// A box or circle the renderer draws empty for a physical stamp.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SealSlot {
    pub kind: SealKind,
    pub label: String,
}

impl SealSlot {
    fn new(kind: SealKind, label: &str) -> Self {
        Self {
            kind,
            label: label.to_string(),
        }
    }
}

/// Complete form structure handed to the renderer.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttestationForm {
    pub title: String,
    pub header: FormHeader,
    pub column_headers: Vec<String>,
    pub pages: Vec<FormPage>,
    pub footer: FormFooter,
    pub seals: Vec<SealSlot>,
}

impl AttestationForm {
    /// Builds the form sheet for a document and its two parties.
    pub fn build(document: &Document, sender: Party, receiver: Party) -> Self {
        let geometry = document.geometry();

        let pages = document
            .pages()
            .iter()
            .enumerate()
            .map(|(index, page)| {
                let rows = (0..geometry.rows_per_page)
                    .map(|r| FormRow {
                        label: row_label(r),
                        cells: match page.row(r) {
                            Some(row) => cell_strings(row),
                            None => vec![String::new(); geometry.cols],
                        },
                    })
                    .collect();

                FormPage {
                    number: index + 1,
                    caption: format!("第 {} 頁", index + 1),
                    rows,
                }
            })
            .collect();

        Self {
            title: FORM_TITLE.to_string(),
            header: FormHeader {
                sender,
                receiver,
                cc_recipient: Party::default(),
                registry_number: None,
            },
            column_headers: (1..=geometry.cols).map(|c| c.to_string()).collect(),
            pages,
            footer: FormFooter {
                page_count: document.page_count(),
                fees: vec![
                    FeeLine::blank("正本"),
                    FeeLine::blank("副本"),
                    FeeLine::blank("附件"),
                    FeeLine::blank("加具正本"),
                    FeeLine::blank("加具副本"),
                ],
                total_fee: None,
                correction: CorrectionNote::default(),
            },
            seals: vec![
                SealSlot::new(SealKind::SenderSeal, "印"),
                SealSlot::new(SealKind::CorrectionSeal, "印"),
                SealSlot::new(SealKind::Postmark, "郵戳"),
                SealSlot::new(SealKind::SeamPostmark, "騎縫郵戳"),
                SealSlot::new(SealKind::SeamPostmark, "騎縫郵戳"),
                SealSlot::new(SealKind::PostageStamp, "郵票或郵資券"),
            ],
        }
    }

    /// Footer summary line, e.g. "本存證信函共 2 頁".
    pub fn page_count_line(&self) -> String {
        format!("本存證信函共 {} 頁", self.footer.page_count)
    }
}

fn cell_strings(row: &Row) -> Vec<String> {
    row.cells()
        .iter()
        .map(|g| g.as_char().map(String::from).unwrap_or_default())
        .collect()
}

/// Chinese numeral label for a 0-based row index, numeric past ten.
pub fn row_label(index: usize) -> String {
    CHINESE_NUMERALS
        .get(index)
        .map(|s| s.to_string())
        .unwrap_or_else(|| (index + 1).to_string())
}
