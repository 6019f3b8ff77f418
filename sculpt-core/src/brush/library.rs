// Copyright (c) 2019-present Dmitry Stepanov and Fyrox Engine contributors.
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

//! A set of brush stamps with a cached kernel of the selected one.

use crate::{
    brush::{BrushKernel, BrushStamp},
    log::Log,
    warn,
};
use std::path::Path;

/// Brush stamps selectable by index. The kernel of the selected stamp is regenerated only when
/// the selection or the brush size changes.
#[derive(Debug)]
pub struct BrushLibrary {
    stamps: Vec<BrushStamp>,
    selected: usize,
    size: usize,
    kernel: BrushKernel,
}

impl BrushLibrary {
    /// Creates new library. The built-in solid stamp is used when `stamps` is empty.
    pub fn new(mut stamps: Vec<BrushStamp>, size: usize) -> Self {
        if stamps.is_empty() {
            stamps.push(BrushStamp::solid());
        }
        let kernel = BrushKernel::generate(&stamps[0], size);
        Self {
            stamps,
            selected: 0,
            size,
            kernel,
        }
    }

    /// Loads stamps from the given image files. Files that cannot be loaded are reported to the
    /// log and skipped.
    pub fn load<I, P>(paths: I, size: usize) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let stamps = paths
            .into_iter()
            .filter_map(|path| {
                let path = path.as_ref();
                Log::verify_message(
                    BrushStamp::from_file(path),
                    format!("Unable to load brush stamp {}", path.display()),
                )
            })
            .collect();
        Self::new(stamps, size)
    }

    #[inline]
    pub fn stamps(&self) -> &[BrushStamp] {
        &self.stamps
    }

    #[inline]
    pub fn selected(&self) -> usize {
        self.selected
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn kernel(&self) -> &BrushKernel {
        &self.kernel
    }

    /// Selects a stamp. Returns `false` and keeps current selection if there is no stamp with
    /// such index.
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.stamps.len() {
            warn!(
                "Brush index {index} is out of range, there are only {} brushes.",
                self.stamps.len()
            );
            return false;
        }
        if index != self.selected {
            self.selected = index;
            self.regenerate();
        }
        true
    }

    pub fn set_size(&mut self, size: usize) {
        if size != self.size {
            self.size = size;
            self.regenerate();
        }
    }

    fn regenerate(&mut self) {
        self.kernel = BrushKernel::generate(&self.stamps[self.selected], self.size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn stamp(value: u8) -> BrushStamp {
        BrushStamp::from_image(format!("{value}"), GrayImage::from_pixel(8, 8, Luma([value])))
            .unwrap()
    }

    #[test]
    fn empty_library_falls_back_to_solid_stamp() {
        let library = BrushLibrary::new(Vec::new(), 3);
        assert_eq!(library.stamps().len(), 1);
        assert_eq!(library.stamps()[0].name(), BrushStamp::SOLID);
        assert_eq!(library.kernel(), &BrushKernel::filled(3, 1.0));
    }

    #[test]
    fn missing_files_are_skipped() {
        let library = BrushLibrary::load(["definitely/not/here.png"], 2);
        assert_eq!(library.stamps()[0].name(), BrushStamp::SOLID);
    }

    #[test]
    fn kernel_follows_selection_and_size() {
        let mut library = BrushLibrary::new(vec![stamp(255), stamp(0)], 4);
        assert_eq!(library.kernel().influence(1, 1), 1.0);

        assert!(library.select(1));
        assert_eq!(library.kernel().influence(1, 1), 0.0);

        assert!(!library.select(2));
        assert_eq!(library.selected(), 1);

        library.set_size(6);
        assert_eq!(library.kernel().size(), 6);
    }
}
