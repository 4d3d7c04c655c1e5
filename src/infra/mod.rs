pub mod opensubtitles;
