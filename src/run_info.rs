use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use getset::{CopyGetters, Getters};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::RunPlotError;

static FLOWCELL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<Flowcell>([^<]*)</Flowcell>").expect("Failed to compile flowcell regex"));
static RUN_ID_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<Run\b[^>]*\bId="([^"]*)""#).expect("Failed to compile run id regex"));
static DATE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<Date>([^<]*)</Date>").expect("Failed to compile date regex"));
static LAYOUT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<FlowcellLayout\b([^>]*?)/?>").expect("Failed to compile layout regex"));
static READ_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<Read\b([^>]*?)/?>").expect("Failed to compile read regex"));
static ATTR_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(\w+)="([^"]*)""#).expect("Failed to compile attribute regex"));

/// Physical layout of the flowcell described by RunInfo.xml.
#[derive(Debug, Clone, Getters, CopyGetters, Serialize, Deserialize)]
pub struct Flowcell {
    #[getset(get = "pub")]
    barcode: String,
    #[getset(get_copy = "pub")]
    lane_count: u16,
    #[getset(get_copy = "pub")]
    surface_count: u16,
    #[getset(get_copy = "pub")]
    swath_count: u16,
    #[getset(get_copy = "pub")]
    tile_count: u16,
}

impl Flowcell {
    pub fn with_attrs(
        barcode: String,
        lane_count: u16,
        surface_count: u16,
        swath_count: u16,
        tile_count: u16,
    ) -> Self {
        Flowcell {
            barcode,
            lane_count,
            surface_count,
            swath_count,
            tile_count,
        }
    }
}

/// One read segment of the run (template or index).
#[derive(Debug, Clone, Copy, CopyGetters, Serialize, Deserialize)]
pub struct ReadSegment {
    #[getset(get_copy = "pub")]
    number: u16,
    #[getset(get_copy = "pub")]
    num_cycles: u16,
    #[getset(get_copy = "pub")]
    is_indexed: bool,
}

impl ReadSegment {
    pub fn with_attrs(number: u16, num_cycles: u16, is_indexed: bool) -> Self {
        ReadSegment {
            number,
            num_cycles,
            is_indexed,
        }
    }
}

/// Run description parsed from RunInfo.xml.
#[derive(Debug, Clone, Getters, Serialize, Deserialize)]
pub struct RunInfo {
    #[getset(get = "pub")]
    run_id: String,
    #[getset(get = "pub")]
    date: Option<NaiveDate>,
    #[getset(get = "pub")]
    flowcell: Flowcell,
    #[getset(get = "pub")]
    reads: Vec<ReadSegment>,
}

impl RunInfo {
    /// Read and parse `RunInfo.xml` from a run folder.
    pub fn read(run_folder: &Path) -> Result<Self, RunPlotError> {
        let path = run_folder.join("RunInfo.xml");
        if !path.is_file() {
            return Err(RunPlotError::MissingRunInfoXml(
                run_folder.display().to_string(),
            ));
        }
        let xml = fs::read_to_string(&path)?;
        Self::parse(&xml)
    }

    /// Parse a RunInfo.xml document.
    pub fn parse(xml: &str) -> Result<Self, RunPlotError> {
        let run_id = RUN_ID_REGEX
            .captures(xml)
            .map(|c| c[1].to_string())
            .unwrap_or_default();
        let barcode = FLOWCELL_REGEX
            .captures(xml)
            .map(|c| c[1].trim().to_string())
            .unwrap_or_default();
        let date = DATE_REGEX
            .captures(xml)
            .and_then(|c| parse_run_date(c[1].trim()));

        let layout_attrs = LAYOUT_REGEX
            .captures(xml)
            .map(|c| c[1].to_string())
            .ok_or_else(|| {
                RunPlotError::MalformedXml("missing FlowcellLayout element".to_string())
            })?;
        let lane_count = attr_u16(&layout_attrs, "LaneCount").ok_or_else(|| {
            RunPlotError::MalformedXml("FlowcellLayout is missing LaneCount".to_string())
        })?;
        let surface_count = attr_u16(&layout_attrs, "SurfaceCount").unwrap_or(1);
        let swath_count = attr_u16(&layout_attrs, "SwathCount").unwrap_or(1);
        let tile_count = attr_u16(&layout_attrs, "TileCount").unwrap_or(1);

        let mut reads = Vec::new();
        for caps in READ_REGEX.captures_iter(xml) {
            let attrs = &caps[1];
            let number = match attr_u16(attrs, "Number") {
                Some(n) => n,
                None => continue,
            };
            let num_cycles = attr_u16(attrs, "NumCycles").ok_or_else(|| {
                RunPlotError::MalformedXml(format!("Read {} is missing NumCycles", number))
            })?;
            let is_indexed = ATTR_REGEX
                .captures_iter(attrs)
                .find(|c| &c[1] == "IsIndexedRead")
                .map(|c| c[2].eq_ignore_ascii_case("Y"))
                .unwrap_or(false);
            reads.push(ReadSegment::with_attrs(number, num_cycles, is_indexed));
        }
        if reads.is_empty() {
            return Err(RunPlotError::MalformedXml(
                "no Read elements found".to_string(),
            ));
        }
        reads.sort_by_key(|r| r.number());

        Ok(RunInfo {
            run_id,
            date,
            flowcell: Flowcell::with_attrs(barcode, lane_count, surface_count, swath_count, tile_count),
            reads,
        })
    }

    /// Total number of cycles across all read segments.
    pub fn total_cycles(&self) -> u16 {
        self.reads.iter().map(|r| r.num_cycles()).sum()
    }
}

fn attr_u16(attrs: &str, name: &str) -> Option<u16> {
    ATTR_REGEX
        .captures_iter(attrs)
        .find(|c| &c[1] == name)
        .and_then(|c| c[2].parse::<u16>().ok())
}

// Instruments write either the compact yymmdd form or an ISO date.
fn parse_run_date(raw: &str) -> Option<NaiveDate> {
    if raw.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%y%m%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .or_else(|_| NaiveDate::parse_from_str(raw, "%m/%d/%Y"))
        .ok()
}
