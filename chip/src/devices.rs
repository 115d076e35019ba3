use crate::display::Display;

#[cfg_attr(test, mockall::automock)]
/// The trait responsible for handing the framebuffer over to a renderer.
///
/// It gets called by the runner every time the framebuffer changed, the renderer
/// is expected to copy what it needs and paint at its own pace.
pub trait DisplayCommands {
    /// Will receive the current state of the framebuffer
    fn display(&mut self, display: &Display);
}
