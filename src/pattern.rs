use crate::VERSION;
use anyhow::{anyhow, Context, Result};
use flate2::{
    read::{GzDecoder, GzEncoder},
    Compression,
};
use rand::{Rng, SeedableRng};
use std::{io::Read, iter::repeat, path::Path};
use tracing::{debug, warn};

/// Symbol of an alive cell in [`Pattern`] rows.
pub const ALIVE: char = 'O';
/// Symbol of a dead cell in [`Pattern`] rows.
pub const DEAD: char = '.';

const PLAINTEXT_COMMENT: char = '!';

const RLE_COMMENT: char = '#';
const RLE_HEADER: char = 'x';
const RLE_ALIVE: char = 'o';
const RLE_DEAD: char = 'b';
const RLE_EOL: char = '$';
const RLE_EOD: char = '!';
/// Encoded RLE lines are wrapped at this many characters.
const RLE_LINE_LIMIT: usize = 70;

/// A rectangular block of cells decoded from a pattern file or synthesized
/// randomly.
///
/// # Overview
///
/// Every row is a string of the same length made of [`ALIVE`] and [`DEAD`]
/// symbols, so `pattern.rows()[y].as_bytes()[x]` is the cell in column `x` of
/// row `y`. A pattern is consumed once to seed a [`Grid`](crate::Grid).
///
/// # Features
///
/// *   **Decoding and encoding** of the formats listed in [`PatternFormat`].
/// *   **Fitting:** [`Pattern::fit`] centers the pattern in a larger tiling,
///     [`Pattern::squared`] pads it to a square.
/// *   **Random soups** through [`Pattern::random`].
///
/// # Empty patterns
///
/// A pattern with no rows or no columns is empty. [`Pattern::from_file`]
/// returns an empty pattern for a missing or empty file, and grids refuse to
/// be built from one.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Pattern {
    rows: Vec<String>,
}

impl Pattern {
    /// Builds a pattern from rows of [`ALIVE`] / [`DEAD`] symbols.
    ///
    /// # Errors
    ///
    /// Returns an error if the rows have different lengths or contain
    /// other symbols.
    pub fn from_rows<I, S>(rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let rows: Vec<String> = rows.into_iter().map(Into::into).collect();
        let width = rows.first().map_or(0, String::len);
        for (y, row) in rows.iter().enumerate() {
            Self::validate_row(row, y)?;
            if row.len() != width {
                return Err(anyhow!(
                    "Row {} has length {}, expected {}",
                    y,
                    row.len(),
                    width
                ));
            }
        }
        Ok(Self::normalized(rows))
    }

    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, String::len)
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0
    }

    /// Whether the cell at `(col, row)` is alive; cells outside the pattern
    /// are dead.
    pub fn is_alive(&self, col: usize, row: usize) -> bool {
        self.rows
            .get(row)
            .and_then(|r| r.as_bytes().get(col))
            .is_some_and(|&b| b == ALIVE as u8)
    }

    /// Counts the alive cells.
    pub fn population(&self) -> usize {
        self.rows
            .iter()
            .map(|row| row.bytes().filter(|&b| b == ALIVE as u8).count())
            .sum()
    }

    /// Pads the pattern with dead cells up to `columns` x `rows`.
    ///
    /// The deficit along each axis is split between both sides. When it is
    /// odd, the extra column goes to the right and the extra row goes to the
    /// bottom, so the original cells stay as close to the center as possible.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is empty or does not fit into the
    /// requested tiling. Patterns are never cropped.
    pub fn fit(&self, columns: usize, rows: usize) -> Result<Self> {
        if self.is_empty() {
            return Err(anyhow!("Cannot fit an empty pattern"));
        }
        let (width, height) = (self.width(), self.height());
        if width > columns || height > rows {
            return Err(anyhow!(
                "Pattern of {}x{} cells does not fit into a {}x{} tiling",
                width,
                height,
                columns,
                rows
            ));
        }
        let (dx, dy) = (columns - width, rows - height);
        Ok(self.padded(dx / 2, dy / 2, dx - dx / 2, dy - dy / 2))
    }

    /// Pads the shorter side of the pattern with dead cells to make it square.
    /// Follows the same split rule as [`Pattern::fit`].
    pub fn squared(&self) -> Self {
        let side = self.width().max(self.height());
        let (dx, dy) = (side - self.width(), side - self.height());
        self.padded(dx / 2, dy / 2, dx - dx / 2, dy - dy / 2)
    }

    fn padded(&self, left: usize, top: usize, right: usize, bottom: usize) -> Self {
        if left + top + right + bottom == 0 {
            return self.clone();
        }
        let width = self.width() + left + right;
        let blank: String = repeat(DEAD).take(width).collect();
        let mut rows = Vec::with_capacity(self.height() + top + bottom);
        rows.extend(repeat(blank.clone()).take(top));
        for row in &self.rows {
            let mut padded = String::with_capacity(width);
            padded.extend(repeat(DEAD).take(left));
            padded.push_str(row);
            padded.extend(repeat(DEAD).take(right));
            rows.push(padded);
        }
        rows.extend(repeat(blank).take(bottom));
        Self { rows }
    }

    /// Creates a random pattern ("soup") where every cell is alive with
    /// probability 1/2.
    ///
    /// # Arguments
    ///
    /// * `width`, `height` - Dimensions of the pattern.
    /// * `seed` - Optional seed for the random number generator.
    ///   If None, seeds from the OS.
    ///
    /// # Errors
    ///
    /// Returns an error if a dimension is zero or the cell count overflows.
    pub fn random(width: usize, height: usize, seed: Option<u64>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(anyhow!(
                "Random pattern must not be empty, got {}x{}",
                width,
                height
            ));
        }
        if width.checked_mul(height).is_none() {
            return Err(anyhow!("Random pattern {}x{} is too large", width, height));
        }
        let mut rng = if let Some(x) = seed {
            rand_chacha::ChaCha8Rng::seed_from_u64(x)
        } else {
            rand_chacha::ChaCha8Rng::from_os_rng()
        };
        let mut rows = Vec::with_capacity(height);
        for _ in 0..height {
            let mut row = String::with_capacity(width);
            for _ in 0..width {
                row.push(if rng.random_bool(0.5) { ALIVE } else { DEAD });
            }
            rows.push(row);
        }
        Ok(Self { rows })
    }

    /// Creates a pattern from bytes in the given format.
    ///
    /// # Errors
    ///
    /// Returns format-specific errors:
    /// - `Plaintext`: if a body line contains a symbol other than `O` or `.`
    /// - `RLE`: if the header is missing or unparsable, the body contains an
    ///   unknown command, or the cells exceed the declared dimensions
    /// - compressed variants: if decompression fails, then as above
    pub fn from_format(format: PatternFormat, data: &[u8]) -> Result<Self> {
        let pattern = match format {
            PatternFormat::Plaintext => Self::from_plaintext(data),
            PatternFormat::RLE => Self::from_rle(data),
            PatternFormat::CompressedPlaintext => {
                Self::from_plaintext(&Self::decompress(data)?)
            }
            PatternFormat::CompressedRLE => Self::from_rle(&Self::decompress(data)?),
        }?;
        debug!(
            ?format,
            width = pattern.width(),
            height = pattern.height(),
            "decoded pattern"
        );
        Ok(pattern)
    }

    /// Converts the pattern to the given format.
    ///
    /// # Errors
    ///
    /// Returns an error if compression fails.
    pub fn to_format(&self, format: PatternFormat) -> Result<Vec<u8>> {
        match format {
            PatternFormat::Plaintext => Ok(self.to_plaintext()),
            PatternFormat::RLE => Ok(self.to_rle()),
            PatternFormat::CompressedPlaintext => Self::compress(&self.to_plaintext()),
            PatternFormat::CompressedRLE => Self::compress(&self.to_rle()),
        }
    }

    /// Reads a pattern file, choosing the format by its extension
    /// (see [`PatternFormat::from_path`]).
    ///
    /// A path that does not exist, is not a regular file, or is empty yields
    /// an empty pattern; callers are expected to check [`Pattern::is_empty`].
    ///
    /// # Errors
    ///
    /// Returns an error if the extension is unknown, the file cannot be read,
    /// or its content is malformed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let metadata = match std::fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "pattern file does not exist");
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(err).with_context(|| format!("Failed to stat {}", path.display()));
            }
        };
        if !metadata.is_file() {
            warn!(path = %path.display(), "pattern path is not a regular file");
            return Ok(Self::default());
        }
        if metadata.len() == 0 {
            warn!(path = %path.display(), "pattern file is empty");
            return Ok(Self::default());
        }

        let format = PatternFormat::from_path(path)
            .ok_or_else(|| anyhow!("Unknown pattern format: {}", path.display()))?;
        let data =
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_format(format, &data)
            .with_context(|| format!("Failed to decode {}", path.display()))
    }

    /// Writes the pattern to a file, choosing the format by its extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the extension is unknown or writing fails.
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let format = PatternFormat::from_path(path)
            .ok_or_else(|| anyhow!("Unknown pattern format: {}", path.display()))?;
        let data = self.to_format(format)?;
        std::fs::write(path, data).with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Creates a pattern from [plaintext](https://conwaylife.com/wiki/Plaintext) data.
    ///
    /// Lines starting with `!` are comments, whitespace is dropped. Older
    /// files often omit trailing dead cells or leave all-dead lines blank, so
    /// every row is right-padded with dead cells to the longest row.
    fn from_plaintext(data: &[u8]) -> Result<Self> {
        let text =
            std::str::from_utf8(data).context("Plaintext pattern is not valid UTF-8")?;
        let lines: Vec<String> = text
            .lines()
            .filter(|line| !line.starts_with(PLAINTEXT_COMMENT))
            .map(|line| line.chars().filter(|c| !c.is_whitespace()).collect())
            .collect();

        let width = lines.iter().map(String::len).max().unwrap_or(0);
        let mut rows = Vec::with_capacity(lines.len());
        for (y, mut line) in lines.into_iter().enumerate() {
            Self::validate_row(&line, y)?;
            line.extend(repeat(DEAD).take(width - line.len()));
            rows.push(line);
        }
        Ok(Self::normalized(rows))
    }

    fn to_plaintext(&self) -> Vec<u8> {
        let mut result = format!("{} Generated by gol_grid {}\n", PLAINTEXT_COMMENT, VERSION);
        for row in &self.rows {
            result.push_str(row);
            result.push('\n');
        }
        result.into_bytes()
    }

    /// Creates a pattern from [RLE](https://conwaylife.com/wiki/Run_Length_Encoded) data.
    ///
    /// Rows shorter than the declared width are right-padded with dead cells,
    /// missing rows at the bottom are filled with dead cells. Blank rows past
    /// the declared height are dropped.
    fn from_rle(data: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(data).context("RLE pattern is not valid UTF-8")?;
        let mut lines = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with(RLE_COMMENT));

        let header = lines.next().ok_or_else(|| anyhow!("Missing header"))?;
        if !header.starts_with(RLE_HEADER) {
            return Err(anyhow!("Invalid header: \"{}\"", header));
        }
        let (width, height) = Self::parse_rle_header(header)?;

        let mut rows = Vec::new();
        let mut row = String::new();
        let mut count: Option<usize> = None;
        let push_row = |rows: &mut Vec<String>, row: &mut String| -> Result<()> {
            let mut row = std::mem::take(row);
            if rows.len() >= height {
                if row.contains(ALIVE) {
                    return Err(anyhow!(
                        "Pattern data out of bounds: y = {} with height {}",
                        rows.len(),
                        height
                    ));
                }
                return Ok(());
            }
            row.extend(repeat(DEAD).take(width - row.len()));
            rows.push(row);
            Ok(())
        };

        'body: for line in lines {
            for c in line.chars() {
                match c {
                    '0'..='9' => {
                        let digit = c as usize - '0' as usize;
                        count = Some(
                            count
                                .unwrap_or(0)
                                .checked_mul(10)
                                .and_then(|x| x.checked_add(digit))
                                .ok_or_else(|| anyhow!("Run count is too large"))?,
                        );
                    }
                    RLE_DEAD | RLE_ALIVE => {
                        let n = count.take().unwrap_or(1);
                        if row.len() + n > width {
                            return Err(anyhow!(
                                "Pattern data out of bounds: x = {}, y = {}",
                                row.len() + n - 1,
                                rows.len()
                            ));
                        }
                        let symbol = if c == RLE_ALIVE { ALIVE } else { DEAD };
                        row.extend(repeat(symbol).take(n));
                    }
                    RLE_EOL => {
                        for _ in 0..count.take().unwrap_or(1) {
                            push_row(&mut rows, &mut row)?;
                            // further blank rows would be dropped anyway
                            if rows.len() >= height {
                                break;
                            }
                        }
                    }
                    RLE_EOD => break 'body,
                    c if c.is_whitespace() => continue,
                    _ => return Err(anyhow!("Invalid RLE character: '{}'", c)),
                }
            }
        }
        // the last row is completed either by `!` or by the end of data
        push_row(&mut rows, &mut row)?;
        while rows.len() < height {
            rows.push(repeat(DEAD).take(width).collect());
        }
        Ok(Self::normalized(rows))
    }

    /// Parses `x = <width>, y = <height>[, rule = ...]`. Everything starting
    /// from the `rule` key is ignored, as are unknown keys.
    fn parse_rle_header(line: &str) -> Result<(usize, usize)> {
        let mut width = None;
        let mut height = None;
        for part in line.split(',') {
            let (key, value) = part.split_once('=').ok_or_else(|| {
                anyhow!(
                    "Invalid header: expected \"key = value\", got \"{}\"",
                    part.trim()
                )
            })?;
            let value = value.trim();
            match key.trim() {
                "x" => {
                    width = Some(value.parse::<usize>().with_context(|| {
                        format!("Invalid header: bad width \"{}\"", value)
                    })?)
                }
                "y" => {
                    height = Some(value.parse::<usize>().with_context(|| {
                        format!("Invalid header: bad height \"{}\"", value)
                    })?)
                }
                "rule" => break,
                _ => (),
            }
        }
        let width = width.ok_or_else(|| anyhow!("Invalid header: missing \"x\""))?;
        let height = height.ok_or_else(|| anyhow!("Invalid header: missing \"y\""))?;
        if width.checked_mul(height).is_none() {
            return Err(anyhow!("Invalid header: {}x{} is too large", width, height));
        }
        Ok((width, height))
    }

    /// Converts the pattern to RLE. Trailing dead cells of each row and
    /// trailing blank rows are omitted, consecutive blank rows are merged
    /// into a counted `$`.
    fn to_rle(&self) -> Vec<u8> {
        fn push_run(result: &mut String, line_length: &mut usize, count: usize, symbol: char) {
            let mut run = String::new();
            if count > 1 {
                run.push_str(&count.to_string());
            }
            run.push(symbol);
            if *line_length + run.len() > RLE_LINE_LIMIT {
                result.push('\n');
                *line_length = 0;
            }
            result.push_str(&run);
            *line_length += run.len();
        }

        let mut result = format!(
            "{}C Generated by gol_grid {}\nx = {}, y = {}, rule = B3/S23\n",
            RLE_COMMENT,
            VERSION,
            self.width(),
            self.height()
        );
        let mut line_length = 0;
        let mut eols = 0;
        for (y, row) in self.rows.iter().enumerate() {
            if y > 0 {
                eols += 1;
            }
            let cells = row.trim_end_matches(DEAD).as_bytes();
            if cells.is_empty() {
                continue;
            }
            if eols > 0 {
                push_run(&mut result, &mut line_length, eols, RLE_EOL);
                eols = 0;
            }
            let mut start = 0;
            while start < cells.len() {
                let state = cells[start];
                let len = cells[start..].iter().take_while(|&&b| b == state).count();
                let symbol = if state == ALIVE as u8 { RLE_ALIVE } else { RLE_DEAD };
                push_run(&mut result, &mut line_length, len, symbol);
                start += len;
            }
        }
        push_run(&mut result, &mut line_length, 1, RLE_EOD);
        result.push('\n');
        result.into_bytes()
    }

    fn decompress(data: &[u8]) -> Result<Vec<u8>> {
        let mut decoder = GzDecoder::new(data);
        let mut decompressed_data = Vec::new();
        decoder
            .read_to_end(&mut decompressed_data)
            .context("Failed to decompress pattern data")?;
        Ok(decompressed_data)
    }

    fn compress(data: &[u8]) -> Result<Vec<u8>> {
        let mut encoder = GzEncoder::new(data, Compression::default());
        let mut compressed_data = Vec::new();
        encoder
            .read_to_end(&mut compressed_data)
            .context("Failed to compress pattern data")?;
        Ok(compressed_data)
    }

    fn validate_row(row: &str, y: usize) -> Result<()> {
        match row.chars().find(|&c| c != ALIVE && c != DEAD) {
            Some(c) => Err(anyhow!("Invalid cell symbol '{}' in row {}", c, y)),
            None => Ok(()),
        }
    }

    /// Collapses degenerate shapes (no rows or zero-width rows) into the
    /// canonical empty pattern.
    fn normalized(rows: Vec<String>) -> Self {
        if rows.first().map_or(true, String::is_empty) {
            Self::default()
        } else {
            Self { rows }
        }
    }
}

/// Supported formats for pattern serialization and deserialization.
///
/// Only two-state patterns are supported; RLE rule strings are not
/// interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternFormat {
    /// [Plaintext](https://conwaylife.com/wiki/Plaintext) format (`.cells`):
    /// one line per row, `O` for alive and `.` for dead cells, `!` comments.
    Plaintext,

    /// [RLE](https://conwaylife.com/wiki/Run_Length_Encoded) format (`.rle`):
    /// an `x = .., y = ..` header followed by a run-length encoded body,
    /// `#` comments.
    RLE,

    /// Gzip-compressed plaintext (`.cells.gz`).
    CompressedPlaintext,

    /// Gzip-compressed RLE (`.rle.gz`).
    CompressedRLE,
}

impl PatternFormat {
    /// Detects the format by the file extension, case-insensitively.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let name = path.as_ref().file_name()?.to_str()?.to_ascii_lowercase();
        if name.ends_with(".cells") {
            Some(PatternFormat::Plaintext)
        } else if name.ends_with(".rle") {
            Some(PatternFormat::RLE)
        } else if name.ends_with(".cells.gz") {
            Some(PatternFormat::CompressedPlaintext)
        } else if name.ends_with(".rle.gz") {
            Some(PatternFormat::CompressedRLE)
        } else {
            None
        }
    }
}
