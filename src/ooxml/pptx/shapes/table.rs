/// Table shapes: DrawingML tables (`a:tbl`) inside `p:graphicFrame` elements.
///
/// Tables are transient views over a slide's tree. A table is identified by its
/// ordinal among the discoverable table frames of the slide at the moment of the
/// query; any structural edit can shift those ordinals, so they are recomputed
/// on every call and never stored.
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::xmltree::{NodePath, XmlElement, XmlNode};

/// Path from a graphic frame to its table.
const TBL_CHAIN: &[&str] = &["graphic", "graphicData", "tbl"];

/// A discoverable table: its ordinal on the slide and its tag-carrying title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableInfo {
    pub tbl_id: usize,
    pub title: String,
}

/// Accessible name of a `cNvPr`: `title` when non-empty, else `descr`.
fn accessible_name(c_nv_pr: &XmlElement) -> Option<&str> {
    [c_nv_pr.attr("title"), c_nv_pr.attr("descr")]
        .into_iter()
        .flatten()
        .find(|value| !value.is_empty())
}

fn frame_title(frame: &XmlElement) -> Option<&str> {
    frame
        .find_child_chain(&["nvGraphicFramePr", "cNvPr"])
        .and_then(accessible_name)
}

fn is_table_frame(el: &XmlElement) -> bool {
    el.is("graphicFrame") && el.find_child_chain(TBL_CHAIN).is_some()
}

/// Paths and titles of discoverable table frames in document order.
///
/// Frames without a title or description are skipped and take no ordinal.
pub(crate) fn frame_paths(root: &XmlElement) -> Vec<(NodePath, String)> {
    root.find_paths(is_table_frame)
        .into_iter()
        .filter_map(|path| {
            let title = root.at_path(&path).and_then(frame_title)?.to_string();
            Some((path, title))
        })
        .collect()
}

/// Discover the tables of a slide tree.
pub fn discover(root: &XmlElement) -> Vec<TableInfo> {
    frame_paths(root)
        .into_iter()
        .enumerate()
        .map(|(tbl_id, (_, title))| TableInfo { tbl_id, title })
        .collect()
}

/// Path of the frame holding table `tbl_id`.
pub(crate) fn frame_path(root: &XmlElement, tbl_id: usize) -> Result<NodePath> {
    let mut paths = frame_paths(root);
    let len = paths.len();
    if tbl_id >= len {
        return Err(OoxmlError::IndexOutOfRange {
            what: "table",
            index: tbl_id,
            len,
        });
    }
    Ok(paths.swap_remove(tbl_id).0)
}

fn row_count(tbl: &XmlElement) -> usize {
    tbl.children_named("tr").count()
}

fn column_count(tbl: &XmlElement) -> usize {
    tbl.child("tblGrid")
        .map_or(0, |grid| grid.children_named("gridCol").count())
}

fn column_widths(tbl: &XmlElement) -> Vec<i64> {
    tbl.child("tblGrid")
        .map(|grid| {
            grid.children_named("gridCol")
                .map(|col| {
                    col.attr("w")
                        .and_then(|w| atoi_simd::parse::<i64, false, false>(w.as_bytes()).ok())
                        .unwrap_or(0)
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Text of a table cell, paragraphs joined with newlines.
pub fn cell_text(tc: &XmlElement) -> String {
    let Some(body) = tc.child("txBody") else {
        return String::new();
    };
    body.children_named("p")
        .map(crate::ooxml::pptx::slide::paragraph_text)
        .collect::<Vec<_>>()
        .join("\n")
}

fn out_of_range(what: &'static str, index: usize, len: usize) -> OoxmlError {
    OoxmlError::IndexOutOfRange { what, index, len }
}

fn row_at(tbl: &XmlElement, row: usize) -> Result<&XmlElement> {
    tbl.children_named("tr")
        .nth(row)
        .ok_or_else(|| out_of_range("row", row, row_count(tbl)))
}

fn cell_at(tbl: &XmlElement, row: usize, col: usize) -> Result<&XmlElement> {
    let tr = row_at(tbl, row)?;
    tr.children_named("tc")
        .nth(col)
        .ok_or_else(|| out_of_range("column", col, tr.children_named("tc").count()))
}

/// Read-only view of a table frame.
#[derive(Debug, Clone, Copy)]
pub struct Table<'a> {
    title: Option<&'a str>,
    tbl: &'a XmlElement,
}

impl<'a> Table<'a> {
    /// View over a `p:graphicFrame`; `None` if it holds no table.
    pub fn new(frame: &'a XmlElement) -> Option<Self> {
        let tbl = frame.find_child_chain(TBL_CHAIN)?;
        Some(Self {
            title: frame_title(frame),
            tbl,
        })
    }

    /// The title or description the table is tagged with.
    pub fn title(&self) -> Option<&'a str> {
        self.title
    }

    /// Number of physical rows, header included.
    pub fn row_count(&self) -> usize {
        row_count(self.tbl)
    }

    /// Number of grid columns.
    pub fn column_count(&self) -> usize {
        column_count(self.tbl)
    }

    /// Grid column widths in EMU.
    pub fn column_widths(&self) -> Vec<i64> {
        column_widths(self.tbl)
    }

    pub fn cell_text(&self, row: usize, col: usize) -> Result<String> {
        cell_at(self.tbl, row, col).map(cell_text)
    }

    /// Texts of every cell, row by row.
    pub fn rows_text(&self) -> Vec<Vec<String>> {
        self.tbl
            .children_named("tr")
            .map(|tr| tr.children_named("tc").map(cell_text).collect())
            .collect()
    }
}

/// Mutable view of a table frame.
///
/// Edits are applied to the slide tree immediately; persisting the slide into
/// its part is up to the caller.
#[derive(Debug)]
pub struct TableMut<'a> {
    title: Option<&'a str>,
    /// `p:xfrm/a:ext` of the frame, resized along with the grid
    ext: Option<&'a mut XmlElement>,
    tbl: &'a mut XmlElement,
}

impl<'a> TableMut<'a> {
    /// Mutable view over a `p:graphicFrame`; `None` if it holds no table.
    pub fn new(frame: &'a mut XmlElement) -> Option<Self> {
        let mut title = None;
        let mut ext = None;
        let mut tbl = None;
        for child in frame.elements_mut() {
            if child.is("nvGraphicFramePr") {
                let nv: &'a XmlElement = child;
                title = nv.child("cNvPr").and_then(accessible_name);
            } else if child.is("xfrm") {
                ext = child.child_mut("ext");
            } else if child.is("graphic") {
                tbl = child.find_child_chain_mut(&TBL_CHAIN[1..]);
            }
        }
        Some(Self {
            title,
            ext,
            tbl: tbl?,
        })
    }

    /// Reborrow as a read-only view.
    pub fn as_table(&self) -> Table<'_> {
        Table {
            title: self.title,
            tbl: &*self.tbl,
        }
    }

    fn tbl(&self) -> &XmlElement {
        &*self.tbl
    }

    fn tbl_mut(&mut self) -> &mut XmlElement {
        &mut *self.tbl
    }

    pub fn row_count(&self) -> usize {
        row_count(self.tbl())
    }

    pub fn column_count(&self) -> usize {
        column_count(self.tbl())
    }

    /// Mutable `a:tr` element of a row.
    pub fn row_mut(&mut self, row: usize) -> Result<&mut XmlElement> {
        let len = self.row_count();
        self.tbl_mut()
            .elements_mut()
            .filter(|el| el.is("tr"))
            .nth(row)
            .ok_or_else(|| out_of_range("row", row, len))
    }

    /// Mutable `a:tc` elements of a row.
    pub fn row_cells_mut(&mut self, row: usize) -> Result<impl Iterator<Item = &mut XmlElement>> {
        Ok(self.row_mut(row)?.elements_mut().filter(|el| el.is("tc")))
    }

    /// Mutable `a:tc` element at a row and column.
    pub fn cell_mut(&mut self, row: usize, col: usize) -> Result<&mut XmlElement> {
        let tr = self.row_mut(row)?;
        let len = tr.children_named("tc").count();
        tr.elements_mut()
            .filter(|el| el.is("tc"))
            .nth(col)
            .ok_or_else(|| out_of_range("column", col, len))
    }

    /// Every cell of the table, row by row.
    pub fn cells_mut(&mut self) -> impl Iterator<Item = &mut XmlElement> {
        self.tbl_mut()
            .elements_mut()
            .filter(|el| el.is("tr"))
            .flat_map(|tr| tr.elements_mut().filter(|el| el.is("tc")))
    }

    /// Remove one physical row.
    pub fn remove_row(&mut self, row: usize) -> Result<()> {
        let len = self.row_count();
        if row >= len {
            return Err(out_of_range("row", row, len));
        }
        let index = self
            .tbl()
            .child_index("tr", row)
            .ok_or_else(|| out_of_range("row", row, len))?;
        let removed = self.tbl_mut().children_mut().remove(index);
        if let XmlNode::Element(tr) = removed {
            self.shrink_frame("cy", row_height(&tr));
        }
        Ok(())
    }

    /// Remove every row at index `keep` and beyond; returns how many were removed.
    pub fn truncate_rows(&mut self, keep: usize) -> usize {
        let mut removed = 0;
        let mut height = 0;
        let mut seen = 0;
        self.tbl_mut().remove_children_where(|el| {
            if !el.is("tr") {
                return false;
            }
            seen += 1;
            if seen > keep {
                removed += 1;
                height += row_height(el);
                true
            } else {
                false
            }
        });
        self.shrink_frame("cy", height);
        removed
    }

    /// Remove grid columns and the matching cell of every row.
    ///
    /// Indices refer to the table before the call; duplicates are ignored. The
    /// frame is narrowed by the width of the removed columns.
    pub fn remove_columns(&mut self, columns: &[usize]) -> Result<()> {
        let len = self.column_count();
        if let Some(&bad) = columns.iter().find(|&&col| col >= len) {
            return Err(out_of_range("column", bad, len));
        }
        let mut columns = columns.to_vec();
        columns.sort_unstable();
        columns.dedup();

        let widths = column_widths(self.tbl());
        let removed_width: i64 = columns.iter().map(|&col| widths[col]).sum();

        let tbl = self.tbl_mut();
        if let Some(grid) = tbl.child_mut("tblGrid") {
            remove_nth_named(grid, "gridCol", &columns);
        }
        for tr in tbl.elements_mut().filter(|el| el.is("tr")) {
            remove_nth_named(tr, "tc", &columns);
        }
        self.shrink_frame("cx", removed_width);
        Ok(())
    }

    /// Grid column widths in EMU.
    pub fn column_widths(&self) -> Vec<i64> {
        column_widths(self.tbl())
    }

    /// Replace every grid column width; the frame width becomes their sum.
    pub fn set_column_widths(&mut self, widths: &[i64]) -> Result<()> {
        let len = self.column_count();
        if widths.len() != len {
            return Err(OoxmlError::InvalidFormat(format!(
                "Expected {} column widths, got {}",
                len,
                widths.len()
            )));
        }
        let mut buf = itoa::Buffer::new();
        if let Some(grid) = self.tbl_mut().child_mut("tblGrid") {
            for (col, &width) in grid.elements_mut().filter(|el| el.is("gridCol")).zip(widths) {
                col.set_attr("w", buf.format(width));
            }
        }
        if let Some(ext) = self.ext.as_deref_mut() {
            ext.set_attr("cx", buf.format(widths.iter().sum::<i64>()));
        }
        Ok(())
    }

    /// Subtract `amount` from the frame extent attribute (`cx` or `cy`).
    fn shrink_frame(&mut self, dimension: &str, amount: i64) {
        if amount == 0 {
            return;
        }
        let Some(ext) = self.ext.as_deref_mut() else {
            return;
        };
        let current = ext
            .attr(dimension)
            .and_then(|v| atoi_simd::parse::<i64, false, false>(v.as_bytes()).ok())
            .unwrap_or(0);
        let mut buf = itoa::Buffer::new();
        ext.set_attr(dimension, buf.format((current - amount).max(0)));
    }
}

fn row_height(tr: &XmlElement) -> i64 {
    tr.attr("h")
        .and_then(|h| atoi_simd::parse::<i64, false, false>(h.as_bytes()).ok())
        .unwrap_or(0)
}

/// Remove the child elements named `local_name` at the given sorted ordinals.
fn remove_nth_named(parent: &mut XmlElement, local_name: &str, ordinals: &[usize]) {
    let mut ordinal = 0;
    parent.remove_children_where(|el| {
        if !el.is(local_name) {
            return false;
        }
        let hit = ordinals.binary_search(&ordinal).is_ok();
        ordinal += 1;
        hit
    });
}
