/// Scroll motions a key can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollMotion {
    Down(usize),
    Up(usize),
    HalfPageDown,
    HalfPageUp,
    PageDown,
    PageUp,
    Top,
    Bottom,
}

/// A vertical window over `content_len` rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    offset: usize,
    height: usize,
    content_len: usize,
}

impl Viewport {
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn content_len(&self) -> usize {
        self.content_len
    }

    fn max_offset(&self) -> usize {
        self.content_len.saturating_sub(self.height)
    }

    /// Change dimensions, keeping the offset in range.
    pub fn resize(&mut self, height: usize, content_len: usize) {
        self.height = height;
        self.content_len = content_len;
        self.offset = self.offset.min(self.max_offset());
    }

    pub fn set_offset(&mut self, offset: usize) {
        self.offset = offset.min(self.max_offset());
    }

    pub fn apply(&mut self, motion: ScrollMotion) {
        let half = (self.height / 2).max(1);
        let page = self.height.max(1);
        let target = match motion {
            ScrollMotion::Down(n) => self.offset.saturating_add(n),
            ScrollMotion::Up(n) => self.offset.saturating_sub(n),
            ScrollMotion::HalfPageDown => self.offset.saturating_add(half),
            ScrollMotion::HalfPageUp => self.offset.saturating_sub(half),
            ScrollMotion::PageDown => self.offset.saturating_add(page),
            ScrollMotion::PageUp => self.offset.saturating_sub(page),
            ScrollMotion::Top => 0,
            ScrollMotion::Bottom => usize::MAX,
        };
        self.set_offset(target);
    }

    /// Row indices currently on screen.
    pub fn visible(&self) -> std::ops::Range<usize> {
        self.offset..(self.offset + self.height).min(self.content_len)
    }
}
