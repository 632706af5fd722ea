//! Page-plan resolution: turn the request's page options into one contiguous
//! render span plus an optional post-hoc filter.
//!
//! An explicit page set like `{2, 9}` is still rendered as the single span
//! `[2, 9]` — one rasterizer invocation — and trimmed to the requested pages
//! afterwards by the harvester. Individual invocations per page would pay
//! the rasterizer's document-open cost once per page.
//!
//! Page numbers are 1-based throughout, matching the rasterizer's own
//! numbering. No validation against the actual page count happens here: a
//! document shorter than the span simply yields fewer output files, which is
//! not an error.

use crate::config::ConversionConfig;
use std::collections::BTreeSet;

/// A concrete, validated render plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderPlan {
    /// First page to request from the rasterizer, 1-based.
    pub first: u32,
    /// Last page to request, 1-based, inclusive.
    pub last: u32,
    /// Pages to retain from the rendered span. `None` keeps everything.
    pub filter: Option<BTreeSet<u32>>,
}

impl RenderPlan {
    /// Resolve a plan from the configuration. Rules, in priority order:
    ///
    /// 1. A non-empty `selected_pages` set renders `[min, max]` of the set
    ///    and filters down to exactly the set.
    /// 2. An explicit `first_page` renders from there to `last_page` when
    ///    given, capped by `max_pages`, whichever bound is tighter.
    /// 3. Otherwise pages `1..=max_pages`.
    pub fn resolve(config: &ConversionConfig) -> RenderPlan {
        if let Some(selected) = config.selected_pages.as_ref().filter(|s| !s.is_empty()) {
            if let (Some(&first), Some(&last)) =
                (selected.iter().next(), selected.iter().next_back())
            {
                return RenderPlan {
                    first,
                    last,
                    filter: Some(selected.clone()),
                };
            }
        }

        let max_pages = config.max_pages.max(1);

        if let Some(first) = config.first_page {
            let cap = first.saturating_add(max_pages - 1);
            let last = match config.last_page {
                Some(last) => last.min(cap),
                None => cap,
            };
            return RenderPlan {
                first,
                last,
                filter: None,
            };
        }

        RenderPlan {
            first: 1,
            last: max_pages,
            filter: None,
        }
    }

    /// Number of pages in the requested span.
    pub fn span(&self) -> u32 {
        self.last - self.first + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConversionConfig;

    #[test]
    fn no_bounds_renders_first_max_pages() {
        let config = ConversionConfig::default();
        let plan = RenderPlan::resolve(&config);
        assert_eq!(plan.first, 1);
        assert_eq!(plan.last, 50);
        assert!(plan.filter.is_none());
    }

    #[test]
    fn selected_pages_render_contiguous_hull() {
        let config = ConversionConfig::builder()
            .selected_pages([2, 4])
            .build()
            .unwrap();
        let plan = RenderPlan::resolve(&config);
        assert_eq!(plan.first, 2);
        assert_eq!(plan.last, 4);
        assert_eq!(
            plan.filter.unwrap().into_iter().collect::<Vec<_>>(),
            vec![2, 4]
        );
    }

    #[test]
    fn selected_pages_override_explicit_bounds() {
        let config = ConversionConfig::builder()
            .first_page(1)
            .last_page(40)
            .selected_pages([7, 9])
            .build()
            .unwrap();
        let plan = RenderPlan::resolve(&config);
        assert_eq!((plan.first, plan.last), (7, 9));
        assert!(plan.filter.is_some());
    }

    #[test]
    fn first_page_without_last_is_capped_by_max_pages() {
        let config = ConversionConfig::builder()
            .first_page(3)
            .max_pages(10)
            .build()
            .unwrap();
        let plan = RenderPlan::resolve(&config);
        assert_eq!((plan.first, plan.last), (3, 12));
        assert_eq!(plan.span(), 10);
    }

    #[test]
    fn tighter_of_last_page_and_max_pages_wins() {
        // last_page tighter than the max_pages cap
        let config = ConversionConfig::builder()
            .first_page(1)
            .last_page(5)
            .max_pages(50)
            .build()
            .unwrap();
        assert_eq!(RenderPlan::resolve(&config).last, 5);

        // max_pages cap tighter than last_page
        let config = ConversionConfig::builder()
            .first_page(1)
            .last_page(100)
            .max_pages(10)
            .build()
            .unwrap();
        assert_eq!(RenderPlan::resolve(&config).last, 10);
    }

    #[test]
    fn single_selected_page_renders_span_of_one() {
        let config = ConversionConfig::builder()
            .selected_pages([6])
            .build()
            .unwrap();
        let plan = RenderPlan::resolve(&config);
        assert_eq!((plan.first, plan.last), (6, 6));
        assert_eq!(plan.span(), 1);
    }
}
