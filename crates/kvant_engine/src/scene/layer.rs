//! Draw layers

/// Fixed draw layers, drawn in ascending order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    /// Drawn first
    Background,
    /// Regular scene content
    Middleground,
    /// In front of the scene
    Foreground,
    /// Interface, drawn last with the UI camera
    Ui,
}

impl Layer {
    /// Number of layers
    pub const COUNT: usize = 4;

    /// Every layer in draw order
    pub const ALL: [Self; Self::COUNT] = [Self::Background, Self::Middleground, Self::Foreground, Self::Ui];

    /// Position in [`Layer::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Whether the layer is drawn with the UI camera
    pub fn is_ui(self) -> bool {
        self >= Self::Ui
    }

    /// Name given to the layer's root node
    pub fn name(self) -> &'static str {
        match self {
            Self::Background => "Background",
            Self::Middleground => "Middleground",
            Self::Foreground => "Foreground",
            Self::Ui => "UI",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_order() {
        let indices: Vec<usize> = Layer::ALL.iter().map(|layer| layer.index()).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
        assert!(Layer::Background < Layer::Ui);
        assert!(Layer::Ui.is_ui());
        assert!(!Layer::Foreground.is_ui());
    }
}
