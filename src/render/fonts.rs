use std::path::{Path, PathBuf};

use genpdf::fonts::{self, Builtin, FontData, FontFamily};
use tracing::{debug, info, warn};

use super::BuildError;

/// (regular, bold) pairs with CJK coverage, tried in order.
const CJK_FONTS: &[(&str, &str)] = &[
    (r"C:\Windows\Fonts\simhei.ttf", r"C:\Windows\Fonts\simhei.ttf"),
    (r"C:\Windows\Fonts\msyh.ttf", r"C:\Windows\Fonts\msyhbd.ttf"),
    (
        "/usr/share/fonts/truetype/droid/DroidSansFallbackFull.ttf",
        "/usr/share/fonts/truetype/droid/DroidSansFallbackFull.ttf",
    ),
    (
        "/usr/share/fonts/google-droid-sans-fonts/DroidSansFallbackFull.ttf",
        "/usr/share/fonts/google-droid-sans-fonts/DroidSansFallbackFull.ttf",
    ),
    (
        "/System/Library/Fonts/Supplemental/Arial Unicode.ttf",
        "/System/Library/Fonts/Supplemental/Arial Unicode.ttf",
    ),
    ("/Library/Fonts/Arial Unicode.ttf", "/Library/Fonts/Arial Unicode.ttf"),
];

/// Directories holding Liberation fonts, used for metrics only when the PDF
/// falls back to its built-in Helvetica/Courier glyphs.
const LIBERATION_DIRS: &[&str] = &[
    "/usr/share/fonts/truetype/liberation",
    "/usr/share/fonts/truetype/liberation2",
    "/usr/share/fonts/liberation",
    "/usr/share/fonts/liberation-sans",
    "/usr/share/fonts/liberation-mono",
    "/usr/local/share/fonts",
];
const SANS_NAME: &str = "LiberationSans";
const MONO_NAME: &str = "LiberationMono";

pub struct FontSet {
    pub body: FontFamily<FontData>,
    /// Monospace family for code; `None` means code uses the body family.
    pub code: Option<FontFamily<FontData>>,
    /// Body text is drawn with a built-in PDF font (Windows-1252 only).
    pub body_builtin: bool,
    pub code_builtin: bool,
}

/// Resolve fonts: explicit directory, then platform CJK fonts, then the
/// built-in glyph set.
pub fn load(font_dir: Option<&Path>) -> Result<FontSet, BuildError> {
    let code = builtin_family(MONO_NAME, Builtin::Courier);
    let code_builtin = code.is_some();

    if let Some(dir) = font_dir {
        let body = family_from_dir(dir)?;
        info!("Using fonts from {}", dir.display());
        return Ok(FontSet {
            body,
            code,
            body_builtin: false,
            code_builtin,
        });
    }

    if let Some((path, body)) = cjk_family() {
        info!("Using CJK font {}", path.display());
        return Ok(FontSet {
            body,
            code,
            body_builtin: false,
            code_builtin,
        });
    }

    if let Some(body) = builtin_family(SANS_NAME, Builtin::Helvetica) {
        warn!("No CJK font found, falling back to built-in Helvetica; non-Latin text will be skipped");
        return Ok(FontSet {
            body,
            code,
            body_builtin: true,
            code_builtin,
        });
    }

    Err(BuildError::NoFont(
        "no CJK font and no Liberation fonts found; pass --font-dir".to_string(),
    ))
}

fn family(regular: FontData, bold: FontData) -> FontFamily<FontData> {
    FontFamily {
        italic: regular.clone(),
        bold_italic: bold.clone(),
        regular,
        bold,
    }
}

fn load_font(path: &Path) -> Result<FontData, BuildError> {
    FontData::load(path, None).map_err(|source| BuildError::Font {
        path: path.to_path_buf(),
        source,
    })
}

/// First `<name>-Regular.ttf` in `dir`, with `<name>-Bold.ttf` if present.
fn family_from_dir(dir: &Path) -> Result<FontFamily<FontData>, BuildError> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| BuildError::NoFont(format!("cannot read {}: {}", dir.display(), e)))?;
    let regular = entries
        .filter_map(|e| e.ok().map(|e| e.path()))
        .find(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with("-Regular.ttf"))
        })
        .ok_or_else(|| BuildError::NoFont(format!("no *-Regular.ttf in {}", dir.display())))?;

    let bold = bold_sibling(&regular);
    let regular_data = load_font(&regular)?;
    let bold_data = match bold.filter(|p| p.exists()) {
        Some(path) => load_font(&path)?,
        None => regular_data.clone(),
    };
    Ok(family(regular_data, bold_data))
}

fn bold_sibling(regular: &Path) -> Option<PathBuf> {
    let name = regular.file_name()?.to_str()?;
    Some(regular.with_file_name(name.replace("-Regular.ttf", "-Bold.ttf")))
}

fn cjk_family() -> Option<(PathBuf, FontFamily<FontData>)> {
    for (regular, bold) in CJK_FONTS {
        let regular = Path::new(regular);
        if !regular.exists() {
            continue;
        }
        let loaded = load_font(regular).and_then(|r| {
            let b = if Path::new(bold).exists() {
                load_font(Path::new(bold))?
            } else {
                r.clone()
            };
            Ok(family(r, b))
        });
        match loaded {
            Ok(f) => return Some((regular.to_path_buf(), f)),
            Err(e) => warn!("{}", e),
        }
    }
    None
}

fn builtin_family(name: &str, builtin: Builtin) -> Option<FontFamily<FontData>> {
    let regular = format!("{}-Regular.ttf", name);
    let dir = LIBERATION_DIRS
        .iter()
        .map(Path::new)
        .find(|d| d.join(&regular).exists())?;
    match fonts::from_files(dir, name, Some(builtin)) {
        Ok(f) => Some(f),
        Err(e) => {
            debug!("{} in {}: {}", name, dir.display(), e);
            None
        }
    }
}
