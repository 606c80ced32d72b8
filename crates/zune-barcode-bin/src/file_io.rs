/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::path::Path;

/// What an output file holds, picked from its extension
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OutputKind {
    Png,
    Svg,
    Text
}

impl OutputKind {
    pub fn from_path(path: &Path) -> Option<OutputKind> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(OutputKind::Png),
            "svg" => Some(OutputKind::Svg),
            "txt" => Some(OutputKind::Text),
            _ => None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_from_extensions() {
        assert_eq!(OutputKind::from_path(Path::new("a/b.PNG")), Some(OutputKind::Png));
        assert_eq!(OutputKind::from_path(Path::new("code.svg")), Some(OutputKind::Svg));
        assert_eq!(OutputKind::from_path(Path::new("code.txt")), Some(OutputKind::Text));
        assert_eq!(OutputKind::from_path(Path::new("code.gif")), None);
        assert_eq!(OutputKind::from_path(Path::new("code")), None);
    }
}
