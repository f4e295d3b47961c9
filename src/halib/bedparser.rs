use crate::halib::GenomeLoc;
use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::{Path, PathBuf},
};

/// Reads tab delimited bed files of active regions, requiring start < end
/// and entries sorted within each chromosome
pub struct BedParser {
    file: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BedEntry {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
}

impl BedEntry {
    /// 0-based half-open bed coordinates as a 1-based inclusive locus
    pub fn to_locus(&self) -> GenomeLoc {
        GenomeLoc::new(&self.chrom, self.start + 1, self.end)
    }
}

fn invalid(msg: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg)
}

impl BedParser {
    pub fn new(path: &Path) -> Self {
        Self {
            file: path.to_path_buf(),
        }
    }

    pub fn parse(&self) -> io::Result<Vec<BedEntry>> {
        let reader = BufReader::new(File::open(&self.file)?);
        parse_lines(reader)
    }
}

fn parse_lines<R: BufRead>(reader: R) -> io::Result<Vec<BedEntry>> {
    let mut prev_chrom = String::new();
    let mut prev_start: u64 = 0;
    let mut ret = vec![];

    for line in reader.lines() {
        let line = line?;
        if line.is_empty() || line.starts_with('#') || line.starts_with("track") {
            continue;
        }
        let collection: Vec<&str> = line.split('\t').collect();
        if collection.len() < 3 {
            return Err(invalid(format!("malformed bed line: {}", line)));
        }
        let chrom = collection[0].to_string();
        let start = collection[1]
            .parse::<u64>()
            .map_err(|e| invalid(format!("bad start in {}: {}", line, e)))?;
        let end = collection[2]
            .parse::<u64>()
            .map_err(|e| invalid(format!("bad end in {}: {}", line, e)))?;

        if chrom != prev_chrom {
            prev_chrom.clone_from(&chrom);
            prev_start = 0;
        }

        if end <= start {
            return Err(invalid(format!("malformed bed line: stop <= start {}", line)));
        }
        if start < prev_start {
            return Err(invalid(format!(
                "bed file unordered `sort -k1,1 -k2,2n` offending line {}",
                line
            )));
        }
        prev_start = start;

        ret.push(BedEntry { chrom, start, end });
    }
    Ok(ret)
}
