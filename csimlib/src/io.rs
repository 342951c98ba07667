use std::fs::File;
use std::io::BufRead;
use std::path::Path;
use crate::error::SimError;

/// Opens a trace file for simulation
pub fn open_trace(path: &Path) -> Result<impl BufRead, SimError> {
    let open_error = |source| SimError::TraceOpen {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(open_error)?;
    get_reader(file).map_err(open_error)
}

pub fn get_reader(file: File) -> Result<impl BufRead, std::io::Error> {
    // Compatibility on other systems
    #[cfg(not(unix))]
    {
        use std::io::BufReader;
        // Traces are read line by line, 4096 is the standard block size (or a multiple of it) on most systems
        const BUFFER_SIZE: usize = 40 * 4096;
        Ok(BufReader::with_capacity(BUFFER_SIZE, file))
    }
    // Memory map the file for speed on unix systems
    #[cfg(unix)]
    {
        use std::io::Cursor;
        use memmap2::{Advice, Mmap};
        // Safety: the map is read only, and the trace is not expected to change under a running simulation
        unsafe {
            let m = Mmap::map(&file)?;
            m.advise(Advice::Sequential)?;
            Ok(Cursor::new(m))
        }
    }
}
