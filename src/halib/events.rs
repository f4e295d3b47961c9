/// Decomposing a haplotype-to-reference alignment into variant events
use crate::halib::{
    Allele, CollaboratorError, EventKind, EventMap, GenomeLoc, GenotypingParams, HapasmError,
    Result, VariantEvent,
};
use rust_htslib::bam::record::{Cigar, CigarString};

/// Haplotype bases that never count as a difference
const FILLER: u8 = b'N';
/// Matching bases allowed after a mismatch before the streak is closed
const LOOK_AHEAD: usize = 5;

/// Smith-Waterman scoring handed to the aligner
#[derive(Debug, Clone, PartialEq)]
pub struct SwScores {
    pub match_value: f64,
    pub mismatch_penalty: f64,
    pub gap_open_penalty: f64,
    pub gap_extension_penalty: f64,
}

impl SwScores {
    pub fn new(gop: f64, gcp: f64) -> Self {
        Self {
            match_value: 5.0,
            mismatch_penalty: -8.0,
            gap_open_penalty: -gop,
            gap_extension_penalty: -gcp,
        }
    }
}

impl From<&GenotypingParams> for SwScores {
    fn from(params: &GenotypingParams) -> Self {
        SwScores::new(params.gop, params.gcp)
    }
}

/// Placement of an alternate sequence against the reference
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    /// Offset of the alignment into the reference. Negative means the aligner failed
    pub alignment_start: i64,
    pub cigar: CigarString,
}

impl Alignment {
    pub fn new(alignment_start: i64, cigar: Vec<Cigar>) -> Self {
        Self {
            alignment_start,
            cigar: CigarString(cigar),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.alignment_start < 0
    }
}

/// External pairwise aligner
pub trait PairwiseAligner {
    fn align(
        &self,
        reference: &[u8],
        alternate: &[u8],
        scores: &SwScores,
    ) -> std::result::Result<Alignment, CollaboratorError>;
}

struct MismatchStreak {
    hap_start: usize,
    hap_stop: usize,
    ref_start: usize,
    since_mismatch: usize,
}

fn bases_at<'a>(
    bases: &'a [u8],
    start: usize,
    len: usize,
    sequence: &'static str,
) -> Result<&'a [u8]> {
    bases
        .get(start..start + len)
        .ok_or(HapasmError::AlignmentOverrun {
            sequence,
            position: start + len,
            length: bases.len(),
        })
}

fn base_at(bases: &[u8], pos: usize, sequence: &'static str) -> Result<u8> {
    bases
        .get(pos)
        .copied()
        .ok_or(HapasmError::AlignmentOverrun {
            sequence,
            position: pos,
            length: bases.len(),
        })
}

/// Walk the cigar of a haplotype alignment and emit one event per
/// insertion, deletion, and cluster of nearby mismatches.
/// A failed alignment (negative start) produces no events.
/// Events are keyed by genomic start; the first event at a position is kept.
pub fn extract_events(
    alignment: &Alignment,
    ref_bases: &[u8],
    hap_bases: &[u8],
    ref_loc: &GenomeLoc,
) -> Result<EventMap> {
    let mut events = EventMap::new();
    if alignment.is_failed() {
        debug!("alignment failed against {}, no events", ref_loc);
        return Ok(events);
    }

    let mut ref_pos = alignment.alignment_start as usize;
    let mut hap_pos: usize = 0;
    // position of the reference base just before ref_pos
    let anchor = |ref_pos: usize| (ref_loc.start + ref_pos as u64).saturating_sub(1);

    for op in alignment.cigar.0.iter() {
        match *op {
            Cigar::Ins(len) => {
                let len = len as usize;
                let inserted = bases_at(hap_bases, hap_pos, len, "haplotype")?;
                if !inserted.iter().all(|&b| b == FILLER) {
                    let start = anchor(ref_pos);
                    events.entry(start).or_insert_with(|| VariantEvent {
                        loc: GenomeLoc::new(&ref_loc.contig, start, start),
                        ref_allele: Allele::null(true),
                        alt_allele: Allele::new(inserted, false),
                        kind: EventKind::Insertion,
                        ref_base_for_indel: ref_pos.checked_sub(1).and_then(|p| ref_bases.get(p).copied()),
                    });
                }
                hap_pos += len;
            }
            Cigar::SoftClip(len) => {
                hap_pos += len as usize;
            }
            Cigar::Del(len) => {
                let len = len as usize;
                let deleted = bases_at(ref_bases, ref_pos, len, "reference")?;
                let start = anchor(ref_pos);
                events.entry(start).or_insert_with(|| VariantEvent {
                    loc: GenomeLoc::new(&ref_loc.contig, start, start + len as u64),
                    ref_allele: Allele::new(deleted, true),
                    alt_allele: Allele::null(false),
                    kind: EventKind::Deletion,
                    ref_base_for_indel: ref_pos.checked_sub(1).and_then(|p| ref_bases.get(p).copied()),
                });
                ref_pos += len;
            }
            Cigar::Match(len) | Cigar::Equal(len) | Cigar::Diff(len) => {
                let len = len as usize;
                let mut streak: Option<MismatchStreak> = None;
                for i in 0..len {
                    let r = base_at(ref_bases, ref_pos, "reference")?;
                    let h = base_at(hap_bases, hap_pos, "haplotype")?;
                    if r != h && h != FILLER {
                        match streak.as_mut() {
                            Some(s) => {
                                s.hap_stop = hap_pos;
                                s.since_mismatch = 0;
                            }
                            None => {
                                streak = Some(MismatchStreak {
                                    hap_start: hap_pos,
                                    hap_stop: hap_pos,
                                    ref_start: ref_pos,
                                    since_mismatch: 0,
                                })
                            }
                        }
                    }

                    let flush = match streak.as_mut() {
                        Some(s) => {
                            s.since_mismatch += 1;
                            s.since_mismatch > LOOK_AHEAD || i == len - 1
                        }
                        None => false,
                    };
                    if flush {
                        if let Some(s) = streak.take() {
                            let event = mismatch_event(&s, ref_bases, hap_bases, ref_loc);
                            events.entry(event.start()).or_insert(event);
                        }
                    }

                    ref_pos += 1;
                    hap_pos += 1;
                }
            }
            other => return Err(HapasmError::UnsupportedCigar(other.char())),
        }
    }

    if events.is_empty() {
        trace!("haplotype matches the reference over {}", ref_loc);
    }
    Ok(events)
}

fn mismatch_event(
    streak: &MismatchStreak,
    ref_bases: &[u8],
    hap_bases: &[u8],
    ref_loc: &GenomeLoc,
) -> VariantEvent {
    let span = streak.hap_stop - streak.hap_start + 1;
    let start = ref_loc.start + streak.ref_start as u64;
    VariantEvent {
        loc: GenomeLoc::new(&ref_loc.contig, start, start + span as u64 - 1),
        // both slices were bounds checked while scanning the run
        ref_allele: Allele::new(&ref_bases[streak.ref_start..streak.ref_start + span], true),
        alt_allele: Allele::new(&hap_bases[streak.hap_start..=streak.hap_stop], false),
        kind: if span == 1 {
            EventKind::Snp
        } else {
            EventKind::Mnp
        },
        ref_base_for_indel: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REF: &[u8] = b"ACGTACGTACGTACGTACGT";

    fn loc() -> GenomeLoc {
        GenomeLoc::new("chr1", 1001, 1020)
    }

    #[test]
    fn single_insertion_is_anchored() {
        // 3 bases inserted after reference offset 7
        let mut hap = REF[..8].to_vec();
        hap.extend_from_slice(b"GGG");
        hap.extend_from_slice(&REF[8..]);
        let aln = Alignment::new(0, vec![Cigar::Match(8), Cigar::Ins(3), Cigar::Match(12)]);
        let events = extract_events(&aln, REF, &hap, &loc()).unwrap();
        assert_eq!(events.len(), 1);
        let (pos, event) = events.iter().next().unwrap();
        assert_eq!(*pos, 1001 + 7);
        assert_eq!(event.kind, EventKind::Insertion);
        assert_eq!(event.alt_allele.len(), 3);
        assert!(event.ref_allele.is_null());
        assert_eq!(event.ref_base_for_indel, Some(REF[7]));
    }

    #[test]
    fn filler_insertions_are_ignored() {
        let mut hap = REF[..8].to_vec();
        hap.extend_from_slice(b"NN");
        hap.extend_from_slice(&REF[8..]);
        let aln = Alignment::new(0, vec![Cigar::Match(8), Cigar::Ins(2), Cigar::Match(12)]);
        assert!(extract_events(&aln, REF, &hap, &loc()).unwrap().is_empty());
    }

    #[test]
    fn deletion_spans_removed_bases() {
        let mut hap = REF[..5].to_vec();
        hap.extend_from_slice(&REF[9..]);
        let aln = Alignment::new(0, vec![Cigar::Match(5), Cigar::Del(4), Cigar::Match(11)]);
        let events = extract_events(&aln, REF, &hap, &loc()).unwrap();
        assert_eq!(events.len(), 1);
        let event = &events[&1005];
        assert_eq!(event.kind, EventKind::Deletion);
        assert_eq!(event.ref_allele.bases, REF[5..9].to_vec());
        assert!(event.alt_allele.is_null());
        assert_eq!(event.loc.stop, 1005 + 4);
        assert_eq!(event.ref_base_for_indel, Some(REF[4]));
    }

    #[test]
    fn nearby_mismatches_cluster() {
        let mut hap = REF.to_vec();
        hap[2] = b'T';
        hap[4] = b'T';
        let aln = Alignment::new(0, vec![Cigar::Match(20)]);
        let events = extract_events(&aln, REF, &hap, &loc()).unwrap();
        assert_eq!(events.len(), 1);
        let event = &events[&1003];
        assert_eq!(event.kind, EventKind::Mnp);
        assert_eq!(event.ref_allele.bases, REF[2..5].to_vec());
        assert_eq!(event.alt_allele.bases, hap[2..5].to_vec());
        assert_eq!(event.loc.stop, 1005);
    }

    #[test]
    fn distant_mismatches_stay_separate() {
        let mut hap = REF.to_vec();
        hap[2] = b'T';
        hap[12] = b'C';
        let aln = Alignment::new(0, vec![Cigar::Match(20)]);
        let events = extract_events(&aln, REF, &hap, &loc()).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[&1003].kind, EventKind::Snp);
        assert_eq!(events[&1013].kind, EventKind::Snp);
        assert_eq!(events[&1013].alt_allele.bases, b"C".to_vec());
    }

    #[test]
    fn mismatch_at_run_end_is_flushed() {
        let mut hap = REF.to_vec();
        hap[19] = b'A';
        let aln = Alignment::new(0, vec![Cigar::Match(20)]);
        let events = extract_events(&aln, REF, &hap, &loc()).unwrap();
        assert_eq!(events[&1020].kind, EventKind::Snp);
    }

    #[test]
    fn four_matches_keep_a_streak_open() {
        let mut hap = REF.to_vec();
        hap[2] = b'T';
        hap[7] = b'A';
        let aln = Alignment::new(0, vec![Cigar::Match(20)]);
        let events = extract_events(&aln, REF, &hap, &loc()).unwrap();
        assert_eq!(events.len(), 1);
        let event = &events[&1003];
        assert_eq!(event.kind, EventKind::Mnp);
        assert_eq!(event.loc.stop, 1008);
        assert_eq!(event.ref_allele.bases, REF[2..8].to_vec());
        assert_eq!(event.alt_allele.bases, hap[2..8].to_vec());
    }

    #[test]
    fn five_matches_close_a_streak() {
        let mut hap = REF.to_vec();
        hap[2] = b'T';
        hap[8] = b'C';
        let aln = Alignment::new(0, vec![Cigar::Match(20)]);
        let events = extract_events(&aln, REF, &hap, &loc()).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[&1003].kind, EventKind::Snp);
        assert_eq!(events[&1003].loc.stop, 1003);
        assert_eq!(events[&1009].kind, EventKind::Snp);
        assert_eq!(events[&1009].alt_allele.bases, b"C".to_vec());
    }

    #[test]
    fn last_base_mismatch_joins_open_streak() {
        let mut hap = REF.to_vec();
        hap[14] = b'T';
        hap[19] = b'A';
        let aln = Alignment::new(0, vec![Cigar::Match(20)]);
        let events = extract_events(&aln, REF, &hap, &loc()).unwrap();
        assert_eq!(events.len(), 1);
        let event = &events[&1015];
        assert_eq!(event.kind, EventKind::Mnp);
        assert_eq!(event.loc.stop, 1020);
        assert_eq!(event.alt_allele.bases, hap[14..20].to_vec());
    }

    #[test]
    fn last_base_mismatch_after_closed_streak() {
        let mut hap = REF.to_vec();
        hap[13] = b'G';
        hap[19] = b'A';
        let aln = Alignment::new(0, vec![Cigar::Match(20)]);
        let events = extract_events(&aln, REF, &hap, &loc()).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[&1014].kind, EventKind::Snp);
        assert_eq!(events[&1020].kind, EventKind::Snp);
        assert_eq!(events[&1020].ref_allele.bases, b"T".to_vec());
    }

    #[test]
    fn unknown_bases_are_not_mismatches() {
        let mut hap = REF.to_vec();
        hap[6] = b'N';
        let aln = Alignment::new(0, vec![Cigar::Match(20)]);
        assert!(extract_events(&aln, REF, &hap, &loc()).unwrap().is_empty());
    }

    #[test]
    fn soft_clip_advances_haplotype_only() {
        let mut hap = b"TTT".to_vec();
        hap.extend_from_slice(&REF[4..]);
        hap[3 + 6] = b'A'; // REF[10] is G
        let aln = Alignment::new(4, vec![Cigar::SoftClip(3), Cigar::Match(16)]);
        let events = extract_events(&aln, REF, &hap, &loc()).unwrap();
        assert_eq!(events.len(), 1);
        assert!(events.contains_key(&(1001 + 10)));
    }

    #[test]
    fn failed_alignment_has_no_events() {
        let aln = Alignment::new(-1, vec![Cigar::Match(20)]);
        assert!(extract_events(&aln, REF, b"TTTT", &loc()).unwrap().is_empty());
    }

    #[test]
    fn unsupported_operator_is_an_error() {
        let aln = Alignment::new(0, vec![Cigar::Match(5), Cigar::RefSkip(3), Cigar::Match(5)]);
        match extract_events(&aln, REF, REF, &loc()) {
            Err(HapasmError::UnsupportedCigar(c)) => assert_eq!(c, 'N'),
            other => panic!("expected UnsupportedCigar, got {:?}", other),
        }
    }

    #[test]
    fn overrun_is_an_error() {
        let aln = Alignment::new(0, vec![Cigar::Match(25)]);
        assert!(matches!(
            extract_events(&aln, REF, REF, &loc()),
            Err(HapasmError::AlignmentOverrun { .. })
        ));
    }

    #[test]
    fn sw_scores_from_penalties() {
        let scores = SwScores::from(&GenotypingParams::default());
        assert_eq!(scores.match_value, 5.0);
        assert_eq!(scores.mismatch_penalty, -8.0);
        assert_eq!(scores.gap_open_penalty, -30.0);
        assert_eq!(scores.gap_extension_penalty, -0.8);
    }
}
