//! Progress chart assembly and rendering.
//! The flow is:
//!  - [series] turns a habit's sparse logs into a dense daily series, defaults filling gaps.
//!  - [render] collects series for a selection of habits and draws them onto any plotters
//!    backend. Export targets (png file, wallpaper buffer) stay with the callers.

pub mod export;
pub mod render;
pub mod series;
