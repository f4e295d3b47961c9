extern crate pretty_env_logger;

#[macro_use]
extern crate log;

use clap::Parser;
use crossbeam_channel::{unbounded, Receiver, Sender};
use hapasm::{ArgParser, BamParser, BedEntry, BedParser, Haplotype, LocalAssembler};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::thread;
use std::thread::JoinHandle;

#[derive(Serialize)]
struct RegionHaplotypes {
    contig: String,
    start: u64,
    end: u64,
    reads: usize,
    haplotypes: Vec<Haplotype>,
}

enum RegionResult {
    Assembled(RegionHaplotypes),
    Skipped,
}

type InputType = Option<BedEntry>;
type OutputType = Option<RegionResult>;

/// Drain results until the None terminator, writing one json line per
/// assembled region. Skipped regions still advance the bar.
/// Returns (haplotypes written, regions skipped)
fn write_results<W: Write>(
    receiver: &Receiver<OutputType>,
    out: &mut W,
    pbar: &ProgressBar,
) -> std::io::Result<(usize, usize)> {
    let mut num_haps: usize = 0;
    let mut num_skipped: usize = 0;

    loop {
        match receiver.recv() {
            Ok(None) | Err(_) => {
                pbar.finish();
                break;
            }
            Ok(Some(RegionResult::Skipped)) => {
                num_skipped += 1;
                pbar.inc(1);
            }
            Ok(Some(RegionResult::Assembled(result))) => {
                num_haps += result.haplotypes.len();
                serde_json::to_writer(&mut *out, &result)?;
                writeln!(out)?;
                pbar.inc(1);
            }
        }
    }
    out.flush()?;
    Ok((num_haps, num_skipped))
}

fn main() {
    let args = ArgParser::parse();
    let level = if args.io.debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    pretty_env_logger::formatted_timed_builder()
        .filter_level(level)
        .init();

    info!("starting");
    info!("params: {:#?}", args);
    if !args.validate() {
        error!("please fix arguments");
        std::process::exit(1);
    }

    let regions = match BedParser::new(&args.io.bed).parse() {
        Ok(r) => r,
        Err(e) => {
            error!("unable to parse --bed: {}", e);
            std::process::exit(1);
        }
    };
    if regions.is_empty() {
        error!("No regions to be assembled");
        std::process::exit(1);
    }
    let num_regions = regions.len() as u64;

    // Create channels for communication between threads
    let (task_sender, task_receiver): (Sender<InputType>, Receiver<InputType>) = unbounded();
    let (result_sender, result_receiver): (Sender<OutputType>, Receiver<OutputType>) = unbounded();

    info!("spawning {} threads", args.io.threads);
    let task_handles: Vec<JoinHandle<()>> = (0..args.io.threads)
        .map(|_| {
            let m_args = args.clone();
            let m_receiver = task_receiver.clone();
            let m_result_sender = result_sender.clone();

            thread::spawn(move || {
                let mut m_bam = match BamParser::new(
                    &m_args.io.bam,
                    &m_args.io.reference,
                    m_args.io.mapq,
                    m_args.io.mapflag,
                ) {
                    Ok(b) => b,
                    Err(e) => {
                        error!("unable to open --bam/--reference: {}", e);
                        std::process::exit(1);
                    }
                };
                // graphs are rebuilt for every region
                let assembler = LocalAssembler::new(m_args.asm.clone());
                loop {
                    let entry = match m_receiver.recv() {
                        Ok(None) | Err(_) => break,
                        Ok(Some(entry)) => entry,
                    };
                    let result = match m_bam.fetch_region(&entry) {
                        Err(e) => {
                            warn!("skipping {:?}: {}", entry, e);
                            RegionResult::Skipped
                        }
                        Ok(region) if region.reference.is_empty() => {
                            warn!("skipping {}: no reference bases", region.locus);
                            RegionResult::Skipped
                        }
                        Ok(region) => {
                            let ref_hap = Haplotype::reference(region.reference);
                            let haplotypes = assembler.run_local_assembly(&region.reads, ref_hap);
                            debug!("{} has {} haplotypes", region.locus, haplotypes.len());
                            RegionResult::Assembled(RegionHaplotypes {
                                contig: entry.chrom,
                                start: entry.start,
                                end: entry.end,
                                reads: region.reads.len(),
                                haplotypes,
                            })
                        }
                    };
                    if m_result_sender.send(Some(result)).is_err() {
                        break;
                    }
                }
            })
        })
        .collect();

    let out_path = args.io.out.clone();
    let write_handler = thread::spawn(move || {
        let mut out: Box<dyn Write> = match out_path {
            Some(path) => match File::create(&path) {
                Ok(f) => Box::new(BufWriter::new(f)),
                Err(e) => {
                    error!("unable to create {:?}: {}", path, e);
                    std::process::exit(1);
                }
            },
            None => Box::new(BufWriter::new(std::io::stdout())),
        };
        let pbar = match ProgressStyle::with_template(
            " [{elapsed_precise}] {bar:44.cyan/blue} > {pos}/{len} regions",
        ) {
            Ok(sty) => ProgressBar::new(num_regions).with_style(sty.progress_chars("##-")),
            Err(_) => ProgressBar::new(num_regions),
        };
        match write_results(&result_receiver, &mut out, &pbar) {
            Ok(counts) => counts,
            Err(e) => {
                error!("unable to write output: {}", e);
                std::process::exit(1);
            }
        }
    });

    info!("assembling {} regions", num_regions);
    for entry in regions {
        if task_sender.send(Some(entry)).is_err() {
            error!("worker threads exited early");
            std::process::exit(1);
        }
    }

    // Signal worker threads to exit
    for _ in 0..args.io.threads {
        let _ = task_sender.send(None);
    }

    for handle in task_handles {
        if handle.join().is_err() {
            error!("worker thread panicked");
            std::process::exit(1);
        }
    }

    // There will be no more results made
    let _ = result_sender.send(None);

    match write_handler.join() {
        Ok((num_haps, num_skipped)) => {
            info!("wrote {} haplotypes", num_haps);
            if num_skipped > 0 {
                warn!("skipped {} of {} regions", num_skipped, num_regions);
            }
        }
        Err(_) => {
            error!("writer thread panicked");
            std::process::exit(1);
        }
    }
    info!("finished");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assembled(start: u64) -> RegionResult {
        RegionResult::Assembled(RegionHaplotypes {
            contig: "chr1".to_string(),
            start,
            end: start + 4,
            reads: 0,
            haplotypes: vec![Haplotype::reference(b"ACGT".to_vec())],
        })
    }

    #[test]
    fn skipped_regions_advance_the_bar() {
        let (sender, receiver) = unbounded();
        sender.send(Some(assembled(10))).unwrap();
        sender.send(Some(RegionResult::Skipped)).unwrap();
        sender.send(Some(assembled(20))).unwrap();
        sender.send(None).unwrap();

        let pbar = ProgressBar::hidden();
        pbar.set_length(3);
        let mut out = Vec::<u8>::new();
        let (num_haps, num_skipped) = write_results(&receiver, &mut out, &pbar).unwrap();
        assert_eq!(num_haps, 2);
        assert_eq!(num_skipped, 1);
        assert_eq!(pbar.position(), 3);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["start"], 10);
        assert_eq!(first["haplotypes"][0]["bases"], "ACGT");
    }
}
