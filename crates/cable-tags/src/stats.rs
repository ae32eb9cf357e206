use crate::layout::page_pair_count;
use crate::options::TagOptions;
use crate::types::{Result, SourceRow, TagError, TagStatistics};

/// Calculate statistics for a print run
pub fn calculate_statistics(rows: &[SourceRow], options: &TagOptions) -> Result<TagStatistics> {
    options.validate()?;

    let tag_instances = rows
        .iter()
        .try_fold(0usize, |total, row| total.checked_add(row.quantity.max(1)))
        .ok_or(TagError::TooManyTags)?;
    if tag_instances == 0 {
        return Err(TagError::NoTags);
    }

    let tags_per_page = options.tags_per_page();
    let page_pairs = page_pair_count(tag_instances, tags_per_page);
    let output_pages = page_pairs.checked_mul(2).ok_or(TagError::TooManyTags)?;

    Ok(TagStatistics {
        source_rows: rows.len(),
        tag_instances,
        tags_per_page,
        page_pairs,
        output_pages,
        free_slots_on_last_page: (tags_per_page - tag_instances % tags_per_page) % tags_per_page,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(quantities: &[usize]) -> Vec<SourceRow> {
        quantities
            .iter()
            .map(|&quantity| SourceRow {
                system: "S".to_string(),
                quantity,
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn test_stats_no_rows() {
        let result = calculate_statistics(&[], &TagOptions::default());
        assert!(matches!(result, Err(TagError::NoTags)));
    }

    #[test]
    fn test_stats_single_tag() {
        let stats = calculate_statistics(&rows(&[3]), &TagOptions::default()).unwrap();
        assert_eq!(stats.source_rows, 1);
        assert_eq!(stats.tag_instances, 3);
        assert_eq!(stats.tags_per_page, 25);
        assert_eq!(stats.page_pairs, 1);
        assert_eq!(stats.output_pages, 2);
        assert_eq!(stats.free_slots_on_last_page, 22);
    }

    #[test]
    fn test_stats_exact_page() {
        let stats = calculate_statistics(&rows(&[10, 15]), &TagOptions::default()).unwrap();
        assert_eq!(stats.page_pairs, 1);
        assert_eq!(stats.free_slots_on_last_page, 0);
    }

    #[test]
    fn test_stats_spill_to_second_pair() {
        let stats = calculate_statistics(&rows(&[20, 0, 5]), &TagOptions::default()).unwrap();
        // Zero quantity still prints once
        assert_eq!(stats.tag_instances, 26);
        assert_eq!(stats.page_pairs, 2);
        assert_eq!(stats.output_pages, 4);
        assert_eq!(stats.free_slots_on_last_page, 24);
    }

    #[test]
    fn test_stats_reject_overflowing_total() {
        let result = calculate_statistics(&rows(&[usize::MAX, 1]), &TagOptions::default());
        assert!(matches!(result, Err(TagError::TooManyTags)));
    }

    #[test]
    fn test_stats_follow_grid_options() {
        let options = TagOptions {
            rows: 4,
            ..Default::default()
        };
        let stats = calculate_statistics(&rows(&[21]), &options).unwrap();
        assert_eq!(stats.tags_per_page, 20);
        assert_eq!(stats.page_pairs, 2);
    }
}
