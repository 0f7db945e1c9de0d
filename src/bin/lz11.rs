use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{debug, warn};
use memmap2::Mmap;

use lz11::{
    decode_tileset, AlphaMode, BatchCodec, BatchConfig, Codec, CodecStats, CompressConfig,
    Compressor, DecompressConfig, Decompressor, Lz11Header, SearchStrategy,
    MAX_DECOMPRESSED_SIZE,
};

#[derive(Parser, Debug)]
#[command(name = "lz11")]
#[command(about = "Compress and decompress LZ11 (LZSS 0x11) resource files")]
#[command(version)]
struct Cli {
    /// Show verbose statistics and debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compress a file
    Compress {
        #[command(flatten)]
        io: IoArgs,
        #[command(flatten)]
        opts: CompressArgs,
    },
    /// Decompress a file
    Decompress {
        #[command(flatten)]
        io: IoArgs,
        /// Reject streams declaring more than this many bytes
        #[arg(long, default_value_t = MAX_DECOMPRESSED_SIZE)]
        max_size: usize,
    },
    /// Check if input is LZ11 and exit (0=LZ11, 1=not LZ11, 2=error)
    Check {
        /// Input file (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,
        /// Also decode the stream to validate it fully
        #[arg(long)]
        strict: bool,
    },
    /// Decode an uncompressed tileset texture to premultiplied ARGB32
    Tileset {
        #[command(flatten)]
        io: IoArgs,
        /// Force every pixel opaque
        #[arg(long)]
        no_alpha: bool,
    },
    /// Process many files on a worker pool
    Batch {
        /// Operation to apply to every file
        #[arg(value_enum)]
        mode: BatchMode,
        /// Input files
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Number of threads (0 = auto, 1 = single-threaded)
        #[arg(short = 't', long, default_value = "0")]
        threads: usize,
        /// Suffix added to compressed files and stripped from decompressed ones
        #[arg(long, default_value = ".lz")]
        suffix: String,
        /// Reject streams declaring more than this many bytes (decompress only)
        #[arg(long)]
        max_size: Option<usize>,
        #[command(flatten)]
        opts: CompressArgs,
    },
}

#[derive(Args, Debug)]
struct IoArgs {
    /// Input file (use - for stdin)
    #[arg(short, long)]
    input: PathBuf,
    /// Output file (use - for stdout)
    #[arg(short, long)]
    output: PathBuf,
}

#[derive(Args, Debug, Clone, Copy)]
struct CompressArgs {
    /// Allow self-overlapping matches (smaller output, differs from the reference encoder)
    #[arg(long)]
    overlap: bool,
    /// Use the exhaustive window scan instead of hash chains
    #[arg(long)]
    exhaustive: bool,
}

impl CompressArgs {
    fn config(self) -> CompressConfig {
        CompressConfig {
            strategy: if self.exhaustive {
                SearchStrategy::Exhaustive
            } else {
                SearchStrategy::HashChain
            },
            allow_overlap: self.overlap,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum BatchMode {
    Compress,
    Decompress,
}

/// Exit codes for check mode
const EXIT_IS_LZ11: u8 = 0;
const EXIT_NOT_LZ11: u8 = 1;
const EXIT_ERROR: u8 = 2;

/// Files at least this large are memory-mapped instead of read
const MMAP_THRESHOLD: u64 = 1 << 20;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn run(cli: Cli) -> Result<u8, Box<dyn std::error::Error>> {
    let verbose = cli.verbose;
    match cli.command {
        Command::Compress { io, opts } => {
            let compressor = Compressor::new(opts.config());
            run_single(&compressor, &io, verbose, "Compression")
        }
        Command::Decompress { io, max_size } => {
            let decompressor = Decompressor::new(DecompressConfig { max_size });
            run_single(&decompressor, &io, verbose, "Decompression")
        }
        Command::Check { input, strict } => run_check_mode(&input, strict),
        Command::Tileset { io, no_alpha } => {
            let input = read_input(&io.input)?;
            let mode = if no_alpha { AlphaMode::Opaque } else { AlphaMode::Blend };
            let decoded = decode_tileset(&input, mode)?;
            write_output(&io.output, &decoded)?;
            Ok(0)
        }
        Command::Batch { mode, files, threads, suffix, max_size, opts } => {
            let batch = BatchCodec::new(BatchConfig { num_threads: threads });
            match mode {
                BatchMode::Compress => {
                    if max_size.is_some() {
                        return Err("--max-size only applies to batch decompress".into());
                    }
                    let compressor = Compressor::new(opts.config());
                    run_batch(&batch, &compressor, &files, &suffix, mode, verbose)
                }
                BatchMode::Decompress => {
                    if opts.overlap || opts.exhaustive {
                        let msg = "--overlap and --exhaustive only apply to batch compress";
                        return Err(msg.into());
                    }
                    let max_size = max_size.unwrap_or(MAX_DECOMPRESSED_SIZE);
                    let decompressor = Decompressor::new(DecompressConfig { max_size });
                    run_batch(&batch, &decompressor, &files, &suffix, mode, verbose)
                }
            }
        }
    }
}

fn run_single<C: Codec>(
    codec: &C,
    io: &IoArgs,
    verbose: bool,
    label: &str,
) -> Result<u8, Box<dyn std::error::Error>> {
    let input = read_input(&io.input)?;

    let start = Instant::now();
    let (output, stats) = codec.process(&input)?;
    let elapsed = start.elapsed();

    write_output(&io.output, &output)?;

    if verbose {
        print_stats(label, &stats, elapsed);
    }
    Ok(0)
}

fn print_stats(label: &str, stats: &CodecStats, elapsed: std::time::Duration) {
    eprintln!("{} complete:", label);
    eprintln!("  Input bytes:      {}", stats.input_bytes);
    eprintln!("  Output bytes:     {}", stats.output_bytes);
    eprintln!("  Literals:         {}", stats.literals);
    eprintln!("  Matches:          {}", stats.matches);
    if stats.trailing_bytes > 0 {
        eprintln!("  Trailing bytes:   {}", stats.trailing_bytes);
    }
    eprintln!("  Time:             {:.2?}", elapsed);
    eprintln!(
        "  Throughput:       {:.1} MB/s",
        stats.input_bytes as f64 / elapsed.as_secs_f64() / 1_000_000.0
    );
}

fn run_check_mode(input: &Path, strict: bool) -> Result<u8, Box<dyn std::error::Error>> {
    let data = read_input(input)?;

    let header = match Lz11Header::parse(&data) {
        Ok(header) => header,
        Err(e) if e.is_format_mismatch() => {
            eprintln!("LZ11: no");
            return Ok(EXIT_NOT_LZ11);
        }
        Err(e) => return Err(e.into()),
    };

    eprintln!("LZ11: yes");
    eprintln!("Header: {} bytes", header.header_len);
    eprintln!("Decompressed size: {} bytes", header.decompressed_size);

    if strict {
        let (_, stats) = Decompressor::default().decompress_with_stats(&data)?;
        eprintln!("Stream: valid ({} literals, {} matches)", stats.literals, stats.matches);
        if stats.trailing_bytes > 0 {
            eprintln!("Trailing bytes: {}", stats.trailing_bytes);
        }
    }

    Ok(EXIT_IS_LZ11)
}

fn run_batch<C: Codec + Sync>(
    batch: &BatchCodec,
    codec: &C,
    files: &[PathBuf],
    suffix: &str,
    mode: BatchMode,
    verbose: bool,
) -> Result<u8, Box<dyn std::error::Error>> {
    let inputs = files.iter().map(|path| read_input(path)).collect::<io::Result<Vec<_>>>()?;

    let start = Instant::now();
    let results = batch.process_all(codec, &inputs)?;
    let elapsed = start.elapsed();

    let mut failures = 0usize;
    for (path, result) in files.iter().zip(results) {
        match result {
            Ok(data) => {
                let target = batch_output_path(path, suffix, mode);
                debug!("{} -> {}", path.display(), target.display());
                fs::write(&target, &data)?;
            }
            Err(e) => {
                warn!("{}: {}", path.display(), e);
                eprintln!("{}: {}", path.display(), e);
                failures += 1;
            }
        }
    }

    if verbose {
        eprintln!("Batch complete:");
        eprintln!("  Files:            {}", files.len());
        eprintln!("  Failed:           {}", failures);
        eprintln!("  Time:             {:.2?}", elapsed);
    }

    Ok(if failures == 0 { 0 } else { EXIT_ERROR })
}

/// Output path for a batch job: add the suffix when compressing, strip it
/// (or append `.out`) when decompressing
fn batch_output_path(path: &Path, suffix: &str, mode: BatchMode) -> PathBuf {
    let name = path.as_os_str().to_string_lossy();
    match mode {
        BatchMode::Compress => PathBuf::from(format!("{}{}", name, suffix)),
        BatchMode::Decompress => match name.strip_suffix(suffix) {
            Some(stem) if !suffix.is_empty() && !stem.is_empty() => PathBuf::from(stem),
            _ => PathBuf::from(format!("{}.out", name)),
        },
    }
}

/// Input bytes, either owned or memory-mapped
enum InputData {
    Owned(Vec<u8>),
    Mapped(Mmap),
}

impl Deref for InputData {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            InputData::Owned(data) => data,
            InputData::Mapped(map) => map,
        }
    }
}

impl AsRef<[u8]> for InputData {
    fn as_ref(&self) -> &[u8] {
        self
    }
}

fn read_input(path: &Path) -> io::Result<InputData> {
    if path.to_str() == Some("-") {
        let mut data = Vec::new();
        io::stdin().lock().read_to_end(&mut data)?;
        return Ok(InputData::Owned(data));
    }

    let mut file = File::open(path)?;
    if file.metadata()?.len() >= MMAP_THRESHOLD {
        // SAFETY: the map is read-only and dropped before the process exits;
        // concurrent truncation by another process is not guarded against.
        let map = unsafe { Mmap::map(&file)? };
        return Ok(InputData::Mapped(map));
    }

    let mut data = Vec::new();
    file.read_to_end(&mut data)?;
    Ok(InputData::Owned(data))
}

fn write_output(path: &Path, data: &[u8]) -> io::Result<()> {
    if path.to_str() == Some("-") {
        let mut stdout = io::stdout().lock();
        stdout.write_all(data)?;
        stdout.flush()
    } else {
        fs::write(path, data)
    }
}
