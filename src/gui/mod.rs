pub mod chart_view;
pub mod theme;
pub mod toolbar;
