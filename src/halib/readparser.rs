use crate::halib::{BedEntry, GenomeLoc};
use rust_htslib::{
    bam::{IndexedReader, Read},
    errors::Error,
    faidx,
};
use std::path::Path;

/// Everything the assembler needs for one active region
#[derive(Debug)]
pub struct RegionReads {
    pub locus: GenomeLoc,
    pub reads: Vec<Vec<u8>>,
    pub reference: Vec<u8>,
}

/// Pulls read bases and reference bases over active regions.
/// Each worker thread owns its own parser.
pub struct BamParser {
    bam: IndexedReader,
    reference: faidx::Reader,
    mapq: u8,
    mapflag: u16,
}

impl BamParser {
    pub fn new(bam_name: &Path, ref_name: &Path, mapq: u8, mapflag: u16) -> Result<Self, Error> {
        let mut bam = IndexedReader::from_path(bam_name)?;
        // only needed for CRAM
        bam.set_reference(ref_name)?;
        let reference = faidx::Reader::from_path(ref_name)?;
        Ok(BamParser {
            bam,
            reference,
            mapq,
            mapflag,
        })
    }

    /// Bases of every usable read overlapping the region plus the reference
    /// bases of the region itself
    pub fn fetch_region(&mut self, entry: &BedEntry) -> Result<RegionReads, Error> {
        self.bam
            .fetch((entry.chrom.as_str(), entry.start, entry.end))?;

        let mapq = self.mapq;
        let mapflag = self.mapflag;
        let reads: Vec<Vec<u8>> = self
            .bam
            .records()
            .filter_map(|r| {
                r.ok().filter(|rec| {
                    !rec.seq().is_empty() && rec.mapq() >= mapq && (rec.flags() & mapflag) == 0
                })
            })
            .map(|rec| rec.seq().as_bytes())
            .collect();

        // faidx end is inclusive
        let reference = self
            .reference
            .fetch_seq(&entry.chrom, entry.start as usize, entry.end as usize - 1)?
            .to_ascii_uppercase();

        debug!(
            "{}:{}-{} {} reads {}bp reference",
            entry.chrom,
            entry.start,
            entry.end,
            reads.len(),
            reference.len()
        );

        Ok(RegionReads {
            locus: entry.to_locus(),
            reads,
            reference,
        })
    }
}
