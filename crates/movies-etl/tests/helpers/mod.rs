//! Test helpers for movies ETL integration tests
//!
//! - Fixture CSVs in the `movies_metadata.csv` layout
//! - Zip archive builder
//! - Mock HTTP server serving an archive
//! - An address nothing listens on

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::io::{Cursor, Write};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zip::write::SimpleFileOptions;

pub const ARCHIVE_PATH: &str = "/the-movies-dataset.zip";

const HEADER: &str = "adult,belongs_to_collection,budget,genres,homepage,id,imdb_id,original_language,original_title,overview,popularity,poster_path,production_companies,production_countries,release_date,revenue,runtime,spoken_languages,status,tagline,title,video,vote_average,vote_count";

/// Three well-formed movies sharing genres and a company
pub fn clean_movies_csv() -> String {
    [
        HEADER,
        r#"False,,30000000,"[{'id': 16, 'name': 'Animation'}, {'id': 35, 'name': 'Comedy'}, {'id': 10751, 'name': 'Family'}]",http://toystory.disney.com/toy-story,862,tt0114709,en,Toy Story,"Led by Woody, Andy's toys live happily in his room.",21.946943,/rhIRbceoE9lR4veEXuwCC2wARtG.jpg,"[{'name': 'Pixar Animation Studios', 'id': 3}]","[{'iso_3166_1': 'US', 'name': 'United States of America'}]",1995-10-30,373554033.0,81.0,"[{'iso_639_1': 'en', 'name': 'English'}]",Released,,Toy Story,False,7.7,5415"#,
        r#"False,,65000000,"[{'id': 12, 'name': 'Adventure'}, {'id': 14, 'name': 'Fantasy'}, {'id': 10751, 'name': 'Family'}]",,8844,tt0113497,en,Jumanji,When siblings Judy and Peter discover an enchanted board game.,17.015539,/vzmL6fP7aPKNKPRTFnZmiUfciyV.jpg,"[{'name': 'TriStar Pictures', 'id': 559}, {'name': 'Teitler Film', 'id': 2550}, {'name': 'Interscope Communications', 'id': 10201}]","[{'iso_3166_1': 'US', 'name': 'United States of America'}]",1995-12-15,262797249.0,104.0,"[{'iso_639_1': 'en', 'name': 'English'}, {'iso_639_1': 'fr', 'name': 'Français'}]",Released,Roll the dice and unleash the excitement!,Jumanji,False,6.9,2413"#,
        r#"False,,0,"[{'id': 16, 'name': 'Animation'}, {'id': 10751, 'name': 'Family'}]",,12,tt0266543,en,Finding Nemo,Nemo is swept out to sea.,25.497794,/syPWyeeqzTQIxjIUaIFI7d0TyEY.jpg,"[{'name': 'Pixar Animation Studios', 'id': 3}]","[{'iso_3166_1': 'US', 'name': 'United States of America'}]",2003-05-30,940335536.0,100.0,"[{'iso_639_1': 'en', 'name': 'English'}]",Released,,Finding Nemo,False,7.6,6292"#,
    ]
    .join("\n")
        + "\n"
}

/// The clean fixture plus a misaligned row and a row with a broken genre list
pub fn messy_movies_csv() -> String {
    let mut csv = clean_movies_csv();
    csv.push_str(
        r#"- Written by Ørnås,/ff9qCepilowshEtG2GYWwzt2bs4.jpg,1997-08-20,0,,,"#,
    );
    csv.push('\n');
    csv.push_str(
        r#"False,,0,"[{'id': 18, 'name': 'Drama'",,949,tt0113277,en,Heat,Obsessive master thief.,17.924927,/zMyfPUelumio3tiDKPffaUpsQTD.jpg,"[{'name': 'Regency Enterprises', 'id': 508}]",[],1995-12-15,187436818.0,170.0,[],Released,,Heat,False,7.7,1886"#,
    );
    csv.push('\n');
    csv
}

/// Zip archive holding `files` as `(name, contents)`
pub fn zip_archive(files: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, contents) in files {
        writer.start_file(*name, SimpleFileOptions::default()).unwrap();
        writer.write_all(contents.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Archive laid out like the published dataset
pub fn dataset_archive(movies_csv: &str) -> Vec<u8> {
    zip_archive(&[
        ("links.csv", "movieId,imdbId,tmdbId\n1,0114709,862\n"),
        ("movies_metadata.csv", movies_csv),
    ])
}

/// Mock server answering `GET ARCHIVE_PATH` with `archive`
pub async fn serve_archive(archive: Vec<u8>) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ARCHIVE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(archive))
        .mount(&server)
        .await;
    server
}

pub fn archive_url(server: &MockServer) -> String {
    format!("{}{}", server.uri(), ARCHIVE_PATH)
}

/// URL on a local port that was just released, so connections are refused
pub fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}{}", port, ARCHIVE_PATH)
}

/// Read a CSV file into rows of strings, header excluded
pub fn read_rows(path: &std::path::Path) -> Vec<Vec<String>> {
    let mut reader = csv::Reader::from_path(path).unwrap();
    reader
        .records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect()
}
