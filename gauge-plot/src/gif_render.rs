use plotters::{coord::Shift, prelude::*};

use super::{plot::draw_points, PlotResult, Series};

/// Used to render a gif, one frame per `update`
pub struct GifRender<'a> {
    root: DrawingArea<BitMapBackend<'a>, Shift>,
    frames: usize,
}

impl<'a> GifRender<'a> {
    /// Create a new instance of `GifRender`, showing each frame for `frame_delay` ms
    pub fn new(filename: &'a str, dims: (u32, u32), frame_delay: u32) -> Result<Self, Box<dyn std::error::Error>> {
        let root = BitMapBackend::gif(filename, dims, frame_delay)?.into_drawing_area();

        Ok(Self { root, frames: 0 })
    }

    /// Number of frames rendered so far
    #[inline(always)]
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Render the current state of a projection as the next frame
    pub fn update(&mut self, points: &Series, caption: &str) -> PlotResult {
        self.root.fill(&WHITE)?;
        draw_points(&self.root, points, caption)?;
        self.root.present()?;
        self.frames += 1;
        trace!("rendered frame {}", self.frames);

        Ok(())
    }
}
