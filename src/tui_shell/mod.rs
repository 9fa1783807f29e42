use anyhow::Result;
use tokio::runtime::Handle;

mod app;
mod forms;
mod input;
mod modal;
mod time_utils;
mod view;

// Shared with submodules via `super::...`.
use app::{Browser, Layer, Overlay};
use forms::RecordForm;
use input::Input;
use time_utils::{fmt_cell, fmt_ts_ui, now_ts};
use view::{RenderCtx, render_view_chrome};

pub(crate) fn run(handle: Handle, opts: crate::tui::TuiRunOptions) -> Result<()> {
    app::run(handle, opts)
}
