//! Interactive shell over the simulated filesystem
//!
//! Thin dispatcher: reads a line, parses a verb, calls into the engine, and
//! prints the structured outcome. All storage semantics live in the library.

use std::io::{self, BufRead, Write};

use clap::Parser;
use simfs::{AllocPolicy, FsError, NodeKind, SimFs};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "simfs-shell")]
#[command(about = "Interactive shell for the simulated block-device filesystem")]
struct Args {
    /// Block size in bytes
    #[arg(short = 'b', long, default_value = "8")]
    block_size: usize,

    /// Total block count
    #[arg(short = 'c', long, default_value = "10000")]
    capacity: usize,

    /// Allocation strategy (indexed, linked)
    #[arg(short = 's', long, default_value = "indexed")]
    strategy: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let policy = match args.strategy.as_str() {
        "indexed" => AllocPolicy::Indexed,
        "linked" => AllocPolicy::Linked,
        other => {
            eprintln!("unknown strategy '{other}', expected 'indexed' or 'linked'");
            std::process::exit(2);
        }
    };

    let mut fs = SimFs::builder()
        .block_size(args.block_size)
        .capacity(args.capacity)
        .policy(policy)
        .build()?;

    println!(
        "simfs shell ({:?} allocation, {} blocks x {} bytes) - type 'help' or 'exit'",
        policy, args.capacity, args.block_size
    );

    let stdin = io::stdin();
    loop {
        print!("{}$ ", fs.current_path());
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some((&verb, rest)) = parts.split_first() else {
            continue;
        };

        match verb {
            "exit" | "quit" => break,
            "help" => print_help(),
            "create" => match rest {
                ["file", name] => report(fs.create_file(name).map(|_| ())),
                ["dir", name] => report(fs.create_dir(name).map(|_| ())),
                _ => println!("usage: create [file|dir] <name>"),
            },
            "ls" => {
                let entries = fs.list();
                if entries.is_empty() {
                    println!("(empty)");
                }
                for entry in entries {
                    let tag = match entry.kind {
                        NodeKind::Directory => "dir",
                        NodeKind::File => "file",
                    };
                    println!("{tag}\t{}", entry.name);
                }
            }
            "cd" => match rest {
                [path] => report(fs.cd(path).map(|_| ())),
                _ => println!("usage: cd <path>"),
            },
            "write" => match rest {
                [name, text @ ..] if !text.is_empty() => {
                    match fs.write(name, text.join(" ").as_bytes()) {
                        Ok(r) => println!("wrote {} bytes in blocks {:?}", r.bytes, r.blocks),
                        Err(e) => println!("error: {e}"),
                    }
                }
                _ => println!("usage: write <file> <text>"),
            },
            "read" => match rest {
                [name] => match fs.read(name) {
                    Ok(data) => println!("{}", String::from_utf8_lossy(&data)),
                    Err(e) => println!("error: {e}"),
                },
                _ => println!("usage: read <file>"),
            },
            "delete" => match rest {
                [name] => match fs.delete(name) {
                    Ok(freed) => println!("deleted, freed {freed} blocks"),
                    Err(e) => println!("error: {e}"),
                },
                _ => println!("usage: delete <name>"),
            },
            "move" => match rest {
                [name, dest] => report(fs.move_entry(name, dest)),
                _ => println!("usage: move <file> <destination>"),
            },
            "stat" => match rest {
                [name] => match fs.stat(name) {
                    Ok(stat) => match stat.kind {
                        NodeKind::File => println!(
                            "file '{}': {} bytes in blocks {:?}",
                            stat.name, stat.size, stat.blocks
                        ),
                        NodeKind::Directory => {
                            println!("dir '{}': {:?}", stat.name, stat.entries)
                        }
                    },
                    Err(e) => println!("error: {e}"),
                },
                _ => println!("usage: stat <name>"),
            },
            "status" => {
                let usage = fs.usage();
                if rest == ["json"] {
                    println!("{}", serde_json::to_string_pretty(&usage)?);
                } else {
                    println!(
                        "blocks: {} total, {} used, {} free | {} files, {} dirs",
                        usage.capacity, usage.used, usage.free, usage.file_count, usage.dir_count
                    );
                    for file in usage.files {
                        println!("  {}: {:?} ({} bytes)", file.path, file.blocks, file.size);
                    }
                }
            }
            other => println!("unknown command '{other}', type 'help'"),
        }
    }
    Ok(())
}

fn report(result: Result<(), FsError>) {
    match result {
        Ok(()) => println!("ok"),
        Err(e) => println!("error: {e}"),
    }
}

fn print_help() {
    println!(
        "commands:\n  create [file|dir] <name>\n  ls\n  cd <path>\n  write <file> <text>\n  \
         read <file>\n  delete <name>\n  move <file> <destination>\n  stat <name>\n  \
         status [json]\n  exit"
    );
}
