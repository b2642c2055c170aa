//! Row pagination: spreading a queue of data rows over a tagged table and over
//! as many copies of its slide as the rows need.
//!
//! Row 0 of a template table is its header. The remaining rows are placeholders
//! whose tags are filled from the data rows, one data row per physical row;
//! placeholders left unused are removed. Capacity is measured on the live table
//! every time, so pages that earlier passes already trimmed hold fewer rows.
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::PackURI;
use crate::ooxml::pptx::cell::Row;
use crate::ooxml::pptx::package::Package;
use crate::ooxml::pptx::slide::Slide;
use crate::ooxml::pptx::substitution::ParagraphSubstitution;
use crate::ooxml::pptx::template::TagSubstitutor;

/// Fill table `tbl_id` of `slide` from the front of `rows` and save the slide.
///
/// Data row `i` is written into physical row `1 + i`: every cell descriptor of
/// the data row is tried against every cell of the physical row. Writing stops
/// when either the rows or the table's data capacity run out, then every
/// physical row after the last written one is removed, leaving only the header
/// when `rows` is empty.
///
/// Returns the rows that did not fit.
///
/// # Errors
///
/// [`OoxmlError::NoRowCapacity`] when the table has no data rows but `rows`
/// is not empty.
pub fn set_rows(
    service: &dyn ParagraphSubstitution,
    pkg: &mut Package,
    slide: &mut Slide,
    tbl_id: usize,
    mut rows: Vec<Row>,
) -> Result<Vec<Row>> {
    let substitutor = TagSubstitutor::new(service);
    let partname = slide.partname().clone();
    let written = {
        let mut table = slide.table_mut(tbl_id)?;
        let capacity = table.row_count().saturating_sub(1);
        if capacity == 0 && !rows.is_empty() {
            let title = table.as_table().title().unwrap_or_default().to_string();
            return Err(OoxmlError::NoRowCapacity(title));
        }

        let written = rows.len().min(capacity);
        for (i, row) in rows[..written].iter().enumerate() {
            for tc in table.row_cells_mut(1 + i)? {
                for cell in row {
                    substitutor.replace_cell_tag(pkg.opc_mut(), &partname, tc, cell)?;
                }
            }
        }
        let removed = table.truncate_rows(1 + written);
        log::debug!(
            "Wrote {} row(s) into table {} of {}, removed {} unused row(s)",
            written,
            tbl_id,
            partname,
            removed
        );
        written
    };
    slide.save(pkg)?;
    Ok(rows.split_off(written))
}

/// First table on `slide` tagged with `tag`.
fn tagged_table(slide: &Slide, tag: &str) -> Result<usize> {
    slide
        .find_tables(tag)
        .first()
        .map(|info| info.tbl_id)
        .ok_or_else(|| OoxmlError::TableNotFound(format!("{} on {}", tag, slide.partname())))
}

/// Paginate `rows` over the table tagged `tag`.
///
/// `existing` are pages already generated from `template` for other tables of
/// the same slide, in presentation order. Their copies of this table are filled
/// first. Remaining rows go to new pages, each a copy of the last existing page
/// (or of `template` when there is none) inserted right after the previous
/// page. When `existing` is empty at least one page is produced, so a template
/// table is always reduced to its header even without data.
///
/// `template` itself is left untouched. Returns the newly created pages.
///
/// Not atomic: if a step fails, pages created and inserted up to that point
/// stay in the package. Scratch copies that were never inserted are removed.
///
/// # Examples
///
/// ```rust,no_run
/// use pptx_templater::ooxml::pptx::{pagination, Cell, Package, RegexSubstitution};
///
/// let mut pkg = Package::open("report.pptx")?;
/// let service = RegexSubstitution::new();
/// let template = pkg.slide(1)?;
/// let rows = (1..=25)
///     .map(|n| vec![Cell::new("{{item}}", format!("Item {}", n))])
///     .collect();
///
/// let pages = pagination::replace_table(&service, &mut pkg, &template, "Items", rows, &mut [])?;
/// template.remove(&mut pkg)?;
/// println!("{} pages", pages.len());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn replace_table(
    service: &dyn ParagraphSubstitution,
    pkg: &mut Package,
    template: &Slide,
    tag: &str,
    rows: Vec<Row>,
    existing: &mut [Slide],
) -> Result<Vec<Slide>> {
    let source = existing.last().unwrap_or(template);
    let last = source.partname().clone();
    let working = source.duplicate(pkg)?;

    let mut created: Vec<Slide> = Vec::new();
    let filled = fill_pages(service, pkg, &working, tag, rows, existing, last, &mut created);
    let removed = working.remove(pkg);
    filled?;
    removed?;
    log::debug!("Table '{}' paginated onto {} new slide(s)", tag, created.len());
    Ok(created)
}

/// Fill the table on `existing`, then on new copies of `working` inserted after
/// `last`. Inserted pages are pushed onto `created`; a copy that fails before
/// insertion is removed again.
#[allow(clippy::too_many_arguments)]
fn fill_pages(
    service: &dyn ParagraphSubstitution,
    pkg: &mut Package,
    working: &Slide,
    tag: &str,
    mut rows: Vec<Row>,
    existing: &mut [Slide],
    mut last: PackURI,
    created: &mut Vec<Slide>,
) -> Result<()> {
    for page in existing.iter_mut() {
        let tbl_id = tagged_table(page, tag)?;
        rows = set_rows(service, pkg, page, tbl_id, rows)?;
    }

    while !rows.is_empty() || (existing.is_empty() && created.is_empty()) {
        let mut page = working.duplicate(pkg)?;
        let filled = tagged_table(&page, tag)
            .and_then(|tbl_id| set_rows(service, pkg, &mut page, tbl_id, rows))
            .and_then(|left| page.insert_after_partname(pkg, Some(&last)).map(|_| left));
        match filled {
            Ok(left) => rows = left,
            Err(e) => {
                page.remove(pkg)?;
                return Err(e);
            }
        }
        last = page.partname().clone();
        created.push(page);
    }
    Ok(())
}
