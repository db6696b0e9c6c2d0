pub mod downloader;
pub mod options;
pub mod playlist;
pub mod rights;
pub mod ytdlp;
