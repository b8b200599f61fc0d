use sauron::{html::attributes::*, html::*, prelude::*};
use shared::view::{filter_options, FilterOption};
use shared::{TaskFilter, TaskStats};

use crate::Msg;

pub fn view_filters(current: TaskFilter, stats: &TaskStats) -> Node<Msg> {
    div(
        [class("mb-6 p-4 bg-ctp-surface0 rounded-lg shadow-lg border border-ctp-surface1")],
        [div(
            [class("flex gap-2")],
            filter_options(current, stats)
                .into_iter()
                .map(view_option)
                .collect::<Vec<_>>(),
        )],
    )
}

fn view_option(option: FilterOption) -> Node<Msg> {
    let filter = option.filter;
    button([
        key(filter.as_str()),
        on_click(move |_| Msg::SetFilter(filter)),
        class(&format!(
            "flex-1 flex items-center justify-center gap-2 px-3 py-2 rounded-md text-sm font-medium transition-colors duration-200 {}",
            if option.active {
                "bg-ctp-blue text-ctp-base"
            } else {
                "text-ctp-subtext0 hover:text-ctp-text hover:bg-ctp-surface1"
            }
        )),
    ], [
        span([], [text(option.icon)]),
        span([], [text(option.label)]),
        span([class(&format!(
            "text-xs px-2 py-0.5 rounded-full {}",
            if option.active {
                "bg-ctp-base/20 text-ctp-base"
            } else {
                "bg-ctp-surface1 text-ctp-subtext0"
            }
        ))], [text(&option.count.to_string())]),
    ])
}
