//! Heuristic table detection from positioned text
//!
//! Works on text runs with bounding boxes (see [`crate::pdf`]) and needs no
//! ruling lines or ML models:
//!
//! 1. Cluster runs into rows by vertical alignment
//! 2. Group consecutive rows with a similar cell count into regions
//! 3. Derive column boundaries from the left edges inside each region
//! 4. Assign every run to a column, joining runs that share a cell
//!
//! Coordinates use a top-left origin: `y` grows down the page.

use std::cmp::Ordering;

/// A text run with its bounding box
#[derive(Debug, Clone, PartialEq)]
pub struct TextCell {
    /// Run text
    pub text: String,
    /// Left coordinate (points)
    pub x: f32,
    /// Top coordinate (points)
    pub y: f32,
    /// Width (points)
    pub width: f32,
    /// Height (points)
    pub height: f32,
}

impl TextCell {
    fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    fn right(&self) -> f32 {
        self.x + self.width
    }
}

/// Table detector configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableDetectorConfig {
    /// Tolerance for row alignment (points) - cells within this Y distance are in same row
    pub row_tolerance: f32,
    /// Tolerance for column alignment (points) - left edges within this X distance share a column
    pub col_tolerance: f32,
    /// Minimum cells on a page before detection is attempted
    pub min_cells: usize,
    /// Minimum rows to consider a region as a table
    pub min_rows: usize,
    /// Minimum columns to consider a region as a table
    pub min_cols: usize,
}

impl Default for TableDetectorConfig {
    fn default() -> Self {
        Self {
            row_tolerance: 5.0,  // 5 points (~1.7mm)
            col_tolerance: 10.0, // 10 points (~3.5mm)
            min_cells: 4,        // 2x2
            min_rows: 2,
            min_cols: 2,
        }
    }
}

/// Layout-based table detector
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TableDetector {
    config: TableDetectorConfig,
}

impl TableDetector {
    /// Create a detector with the default configuration
    #[inline]
    #[must_use = "creates a detector that should be used"]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detector with a custom configuration
    #[inline]
    #[must_use = "creates a detector that should be used"]
    pub const fn with_config(config: TableDetectorConfig) -> Self {
        Self { config }
    }

    /// Detect tables among the text runs of one page
    ///
    /// Each table is returned as rows of cell text, every row as wide as
    /// the table's column count. Pages without tables yield an empty list.
    #[must_use = "returns the detected tables"]
    pub fn detect(&self, cells: &[TextCell]) -> Vec<Vec<Vec<String>>> {
        let cells: Vec<&TextCell> = cells.iter().filter(|c| !c.text.trim().is_empty()).collect();
        if cells.len() < self.config.min_cells {
            return Vec::new();
        }

        let rows = self.cluster_rows(&cells);
        let regions = self.find_table_regions(&rows);
        log::trace!(
            "{} runs clustered into {} rows, {} candidate regions",
            cells.len(),
            rows.len(),
            regions.len()
        );

        regions
            .iter()
            .filter_map(|region| self.build_table(region))
            .collect()
    }

    /// Cluster cells into rows based on Y coordinate alignment
    fn cluster_rows<'a>(&self, cells: &[&'a TextCell]) -> Vec<Vec<&'a TextCell>> {
        let mut rows: Vec<Vec<&TextCell>> = Vec::new();

        for &cell in cells {
            let found_row = rows.iter().position(|row| {
                row.first().is_some_and(|first| {
                    (cell.center_y() - first.center_y()).abs() <= self.config.row_tolerance
                })
            });

            match found_row {
                Some(row_idx) => rows[row_idx].push(cell),
                None => rows.push(vec![cell]),
            }
        }

        for row in &mut rows {
            row.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal));
        }
        rows.sort_by(|a, b| {
            let ay = a.first().map_or(0.0, |c| c.y);
            let by = b.first().map_or(0.0, |c| c.y);
            ay.partial_cmp(&by).unwrap_or(Ordering::Equal)
        });

        rows
    }

    /// Find potential table regions (consecutive rows with similar column counts)
    fn find_table_regions<'a>(&self, rows: &[Vec<&'a TextCell>]) -> Vec<Vec<Vec<&'a TextCell>>> {
        let mut regions: Vec<Vec<Vec<&'a TextCell>>> = Vec::new();
        let mut current_region: Vec<Vec<&'a TextCell>> = Vec::new();
        let mut expected_cols: Option<usize> = None;

        for row in rows {
            let num_cells = row.len();

            // Single-cell rows are paragraphs or captions and end a region
            if num_cells < self.config.min_cols {
                if current_region.len() >= self.config.min_rows {
                    regions.push(std::mem::take(&mut current_region));
                } else {
                    current_region.clear();
                }
                expected_cols = None;
                continue;
            }

            match expected_cols {
                // Allow one cell of slack for empty or merged cells
                Some(exp_cols) if num_cells.abs_diff(exp_cols) <= 1 => {
                    current_region.push(row.clone());
                }
                Some(_) => {
                    if current_region.len() >= self.config.min_rows {
                        regions.push(std::mem::take(&mut current_region));
                    }
                    current_region.clear();
                    current_region.push(row.clone());
                    expected_cols = Some(num_cells);
                }
                None => {
                    current_region.push(row.clone());
                    expected_cols = Some(num_cells);
                }
            }
        }

        if current_region.len() >= self.config.min_rows {
            regions.push(current_region);
        }

        regions
    }

    /// Build table rows from a region
    fn build_table(&self, region: &[Vec<&TextCell>]) -> Option<Vec<Vec<String>>> {
        let col_boundaries = self.find_column_boundaries(region);
        let num_cols = col_boundaries.len().saturating_sub(1);

        if num_cols < self.config.min_cols {
            return None;
        }

        let rows = region
            .iter()
            .map(|row| {
                let mut table_row = vec![String::new(); num_cols];
                for cell in row {
                    let col_idx = find_column_index(cell, &col_boundaries).min(num_cols - 1);
                    let slot = &mut table_row[col_idx];
                    if !slot.is_empty() {
                        slot.push(' ');
                    }
                    slot.push_str(cell.text.trim());
                }
                table_row
            })
            .collect();

        Some(rows)
    }

    /// Find column boundaries from a table region
    fn find_column_boundaries(&self, region: &[Vec<&TextCell>]) -> Vec<f32> {
        let mut x_positions: Vec<f32> = region
            .iter()
            .flat_map(|row| row.iter().map(|c| c.x))
            .collect();
        x_positions.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

        let Some((&first, rest)) = x_positions.split_first() else {
            return Vec::new();
        };

        let mut boundaries = vec![first];
        for &x in rest {
            if boundaries.last().is_some_and(|&last| x - last > self.config.col_tolerance) {
                boundaries.push(x);
            }
        }

        // Right edge of the last column
        if let Some(max_right) = region
            .iter()
            .flat_map(|row| row.iter().map(|c| c.right()))
            .max_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal))
        {
            boundaries.push(max_right);
        }

        boundaries
    }
}

/// Column a cell belongs to; cells past the last boundary go to the last column
fn find_column_index(cell: &TextCell, boundaries: &[f32]) -> usize {
    // Left edge decides; centers of wide runs spill into the next column
    boundaries
        .windows(2)
        .position(|window| cell.x >= window[0] && cell.x < window[1])
        .unwrap_or_else(|| boundaries.len().saturating_sub(2))
}
