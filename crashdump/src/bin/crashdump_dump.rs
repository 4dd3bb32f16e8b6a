// Copyright 2015 Ted Mielczarek. See the COPYRIGHT
// file at the top-level directory of this distribution.

use std::env;
use std::io::{self, Write};
use std::path::Path;
use std::process;

use crashdump::*;

const USAGE: &str = "Usage: crashdump_dump <minidump>";

fn print_stream_error<T: Write>(name: &str, err: &Error, out: &mut T) -> io::Result<()> {
    writeln!(out, "{} cannot print invalid data: {}", name, err)?;
    writeln!(out)
}

fn print_crashdump_dump(path: &Path) -> io::Result<()> {
    let dump = match Minidump::read_path(path) {
        Ok(dump) => dump,
        Err(err) => {
            let mut stderr = io::stderr();
            writeln!(&mut stderr, "Error reading dump: {}", err)?;
            process::exit(1);
        }
    };

    let stdout = &mut io::stdout();
    dump.print(stdout)?;

    match dump.get_system_info() {
        Ok(system_info) => system_info.print(stdout)?,
        Err(Error::StreamNotFound(_)) => (),
        Err(err) => print_stream_error("MinidumpSystemInfo", &err, stdout)?,
    }
    match dump.get_misc_info() {
        Ok(misc_info) => misc_info.print(stdout)?,
        Err(Error::StreamNotFound(_)) => (),
        Err(err) => print_stream_error("MinidumpMiscInfo", &err, stdout)?,
    }
    match dump.get_exception() {
        Ok(exception) => exception.print(stdout)?,
        Err(Error::StreamNotFound(_)) => (),
        Err(err) => print_stream_error("MinidumpException", &err, stdout)?,
    }
    match dump.get_crashpad_info() {
        Ok(crashpad_info) => crashpad_info.print(stdout)?,
        Err(Error::StreamNotFound(_)) => (),
        Err(err) => print_stream_error("MinidumpCrashpadInfo", &err, stdout)?,
    }
    Ok(())
}

#[cfg_attr(test, allow(dead_code))]
fn main() {
    if let Some(dump_arg) = env::args().nth(1) {
        let path = Path::new(&dump_arg);
        if let Err(err) = print_crashdump_dump(path) {
            eprintln!("Error writing output: {}", err);
            process::exit(1);
        }
    } else {
        let mut stderr = io::stderr();
        writeln!(&mut stderr, "{}", USAGE).unwrap();
        process::exit(1);
    }
}
