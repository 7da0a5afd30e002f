use super::node::BlockId;

/// Child indices from the document root down to a node.
pub type Path = Vec<usize>;

/// A position in the document: a leaf path and a byte offset into that leaf.
///
/// Points order by path first, then offset, which is document order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Point {
    pub path: Path,
    pub offset: usize,
}

impl Point {
    pub fn new(path: Path, offset: usize) -> Self {
        Self { path, offset }
    }
}

/// A span between two points. `anchor` is where the selection started,
/// `focus` where it ends; either may come first in document order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Range {
    pub anchor: Point,
    pub focus: Point,
}

pub type Selection = Range;

impl Range {
    pub fn new(anchor: Point, focus: Point) -> Self {
        Self { anchor, focus }
    }

    pub fn collapsed(point: Point) -> Self {
        Self {
            anchor: point.clone(),
            focus: point,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// The earlier of anchor and focus.
    pub fn start(&self) -> &Point {
        if self.anchor <= self.focus {
            &self.anchor
        } else {
            &self.focus
        }
    }

    pub fn end(&self) -> &Point {
        if self.anchor <= self.focus {
            &self.focus
        } else {
            &self.anchor
        }
    }

    pub fn is_backward(&self) -> bool {
        self.focus < self.anchor
    }
}

/// A position expressed against block identity instead of tree shape.
///
/// Structural commands move blocks around, which invalidates paths but not
/// ids; selections are carried through them in this form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BlockPoint {
    pub block: BlockId,
    pub offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BlockRange {
    pub anchor: BlockPoint,
    pub focus: BlockPoint,
}

impl BlockRange {
    pub fn collapsed(point: BlockPoint) -> Self {
        Self {
            anchor: point,
            focus: point,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_and_end_follow_document_order() {
        let later = Point::new(vec![1, 0], 0);
        let earlier = Point::new(vec![0, 0], 5);
        let range = Range::new(later.clone(), earlier.clone());
        assert!(range.is_backward());
        assert_eq!(range.start(), &earlier);
        assert_eq!(range.end(), &later);
    }

    #[test]
    fn deeper_path_sorts_after_its_prefix() {
        assert!(Point::new(vec![0], 3) < Point::new(vec![0, 0], 0));
        assert!(Point::new(vec![0, 1], 0) > Point::new(vec![0, 0], 9));
    }
}
