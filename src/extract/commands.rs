//! Default external tool names, one place. These are the replaceable
//! plug-in surface: operators swap implementations by putting a different
//! binary of the same name on PATH.

pub const FILE: &str = "file";
pub const LYNX: &str = "lynx";
pub const ANTIWORD: &str = "antiword";
pub const CATDOC: &str = "catdoc";
pub const XLS2CSV: &str = "xls2csv";
pub const UNZIP: &str = "unzip";
pub const UNRAR: &str = "unrar";
pub const TAR: &str = "tar";
pub const SEVENZIP: &str = "7z";
pub const PDFTOTEXT: &str = "pdftotext";
pub const PDFIMAGES: &str = "pdfimages";
pub const LNKINFO: &str = "lnkinfo";
pub const STRINGS: &str = "strings";
pub const VINETTO: &str = "vinetto";
pub const EVTX_DUMP: &str = "evtx_dump";
pub const MSGCONVERT: &str = "msgconvert";
pub const RIPMIME: &str = "ripmime";
pub const EXIFTOOL: &str = "exiftool";
pub const TESSERACT: &str = "tesseract";
pub const WHISPER: &str = "whisper";
pub const FFPROBE: &str = "ffprobe";
pub const FFMPEG: &str = "ffmpeg";
pub const CONVERT: &str = "convert";
pub const SQLITE3: &str = "sqlite3";
pub const TCPDUMP: &str = "tcpdump";
pub const PYCDC: &str = "pycdc";
