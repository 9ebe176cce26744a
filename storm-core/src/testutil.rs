//! Fixtures shared by the unit tests: a tiny zip writer and canned KML documents.

use byteorder::{LittleEndian, WriteBytesExt};
use flate2::{Compression, Crc};
use flate2::write::DeflateEncoder;
use std::io::Write;

pub struct ZipEntry<'a> {
    name: &'a str,
    data: &'a [u8],
    deflate: bool,
}

impl<'a> ZipEntry<'a> {
    pub fn stored(name: &'a str, data: &'a [u8]) -> Self {
        Self {
            name,
            data,
            deflate: false,
        }
    }

    pub fn deflated(name: &'a str, data: &'a [u8]) -> Self {
        Self {
            name,
            data,
            deflate: true,
        }
    }
}

/// Builds a minimal zip archive.
pub fn build_zip(entries: &[ZipEntry]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut central = Vec::new();

    for entry in entries {
        let (method, payload) = if entry.deflate {
            let mut enc = DeflateEncoder::new(Vec::new(), Compression::default());
            enc.write_all(entry.data).unwrap();
            (8u16, enc.finish().unwrap())
        } else {
            (0u16, entry.data.to_vec())
        };
        let offset = out.len() as u32;
        let mut crc = Crc::new();
        crc.update(entry.data);

        out.write_all(b"PK\x03\x04").unwrap();
        out.write_u16::<LittleEndian>(20).unwrap();
        out.write_u16::<LittleEndian>(0).unwrap();
        out.write_u16::<LittleEndian>(method).unwrap();
        out.write_u16::<LittleEndian>(0).unwrap();
        out.write_u16::<LittleEndian>(0).unwrap();
        out.write_u32::<LittleEndian>(crc.sum()).unwrap();
        out.write_u32::<LittleEndian>(payload.len() as u32).unwrap();
        out.write_u32::<LittleEndian>(entry.data.len() as u32).unwrap();
        out.write_u16::<LittleEndian>(entry.name.len() as u16).unwrap();
        out.write_u16::<LittleEndian>(0).unwrap();
        out.write_all(entry.name.as_bytes()).unwrap();
        out.write_all(&payload).unwrap();

        central.write_all(b"PK\x01\x02").unwrap();
        central.write_u16::<LittleEndian>(20).unwrap();
        central.write_u16::<LittleEndian>(20).unwrap();
        central.write_u16::<LittleEndian>(0).unwrap();
        central.write_u16::<LittleEndian>(method).unwrap();
        central.write_u16::<LittleEndian>(0).unwrap();
        central.write_u16::<LittleEndian>(0).unwrap();
        central.write_u32::<LittleEndian>(crc.sum()).unwrap();
        central.write_u32::<LittleEndian>(payload.len() as u32).unwrap();
        central.write_u32::<LittleEndian>(entry.data.len() as u32).unwrap();
        central.write_u16::<LittleEndian>(entry.name.len() as u16).unwrap();
        central.write_u16::<LittleEndian>(0).unwrap();
        central.write_u16::<LittleEndian>(0).unwrap();
        central.write_u16::<LittleEndian>(0).unwrap();
        central.write_u16::<LittleEndian>(0).unwrap();
        central.write_u32::<LittleEndian>(0).unwrap();
        central.write_u32::<LittleEndian>(offset).unwrap();
        central.write_all(entry.name.as_bytes()).unwrap();
    }

    let cd_offset = out.len() as u32;
    out.write_all(&central).unwrap();

    out.write_all(b"PK\x05\x06").unwrap();
    out.write_u16::<LittleEndian>(0).unwrap();
    out.write_u16::<LittleEndian>(0).unwrap();
    out.write_u16::<LittleEndian>(entries.len() as u16).unwrap();
    out.write_u16::<LittleEndian>(entries.len() as u16).unwrap();
    out.write_u32::<LittleEndian>(central.len() as u32).unwrap();
    out.write_u32::<LittleEndian>(cd_offset).unwrap();
    out.write_u16::<LittleEndian>(0).unwrap();

    out
}

/// Wraps a KML document into a KMZ the way the agency ships them.
pub fn kmz(kml: &str) -> Vec<u8> {
    build_zip(&[
        ZipEntry::stored("legend.png", b"\x89PNG\r\n"),
        ZipEntry::deflated("doc.kml", kml.as_bytes()),
    ])
}

pub const BEST_TRACK_KML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://earth.google.com/kml/2.2">
<Document>
  <name>AL012014 Best Track</name>
  <Folder id="data">
    <name>Data</name>
    <Placemark>
      <lat>26.3</lat>
      <lon>-79.0</lon>
      <stormName>ARTHUR</stormName>
      <stormNum>1</stormNum>
      <basin>AL</basin>
      <intensityMPH>35</intensityMPH>
      <intensityKPH>55</intensityKPH>
      <minSeaLevelPres>1009</minSeaLevelPres>
      <atcfdtg>2014070112</atcfdtg>
    </Placemark>
    <Placemark>
      <lat>27.1</lat>
      <lon>-79.3</lon>
      <stormName>ARTHUR</stormName>
      <stormNum>1</stormNum>
      <basin>AL</basin>
      <intensityMPH>40</intensityMPH>
      <intensityKPH>65</intensityKPH>
      <minSeaLevelPres>1007</minSeaLevelPres>
      <atcfdtg>2014070118</atcfdtg>
    </Placemark>
    <Placemark>
      <lat>28.4</lat>
      <lon>-79.5</lon>
      <stormName>ARTHUR</stormName>
      <stormNum>1</stormNum>
      <basin>AL</basin>
      <intensityMPH>n/a</intensityMPH>
      <intensityKPH>75</intensityKPH>
      <minSeaLevelPres></minSeaLevelPres>
      <atcfdtg>2014070200</atcfdtg>
    </Placemark>
  </Folder>
</Document>
</kml>"#;

pub const FORECAST_TRACK_KML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
<Document>
  <Folder id="Forecast Track">
    <name>Forecast Track</name>
    <Placemark>
      <name>Forecast Track</name>
      <LineString>
        <coordinates>-79.0,26.3,0 -79.5,28.4,0 -78.2,31.0,0</coordinates>
      </LineString>
    </Placemark>
    <Placemark>
      <name>11:00 PM EDT July 01</name>
      <ExtendedData>
        <Data name="atcfid"><value>al012014</value></Data>
        <Data name="stormNum"><value>1</value></Data>
        <Data name="storm"><value>ARTHUR</value></Data>
        <Data name="basin"><value>al</value></Data>
        <Data name="stormType"><value>TS</value></Data>
        <Data name="advisoryNum"><value>5</value></Data>
        <Data name="advisoryDate"><value>140701/2300 EDT</value></Data>
        <Data name="lat"><value>28.4</value></Data>
        <Data name="lon"><value>-79.5</value></Data>
        <Data name="tcSpd"><value>3</value></Data>
        <Data name="tcDir"><value>360</value></Data>
        <Data name="fctspd"><value>5</value></Data>
        <Data name="dateLbl"><value>11:00 PM Tue</value></Data>
        <Data name="TcDvlp"><value>Tropical Storm</value></Data>
        <Data name="movement"><value>N at 3 mph</value></Data>
        <Data name="timezone"><value>EDT</value></Data>
        <Data name="wndGust"><value>60 mph</value></Data>
        <Data name="mslp"><value>1004</value></Data>
        <Data name="tau"><value>0</value></Data>
        <Data name="maxWnd"><value>45 mph</value></Data>
      </ExtendedData>
      <Point><coordinates>-79.5,28.4,0</coordinates></Point>
    </Placemark>
    <Placemark>
      <name>8:00 PM EDT July 02</name>
      <ExtendedData>
        <Data name="atcfid"><value>al012014</value></Data>
        <Data name="storm"><value>ARTHUR</value></Data>
        <Data name="advisoryDate"><value>140701/2300 EDT</value></Data>
        <Data name="lat"><value>31.0</value></Data>
        <Data name="lon"><value>-78.2</value></Data>
        <Data name="tcSpd"><value>fast</value></Data>
        <Data name="tau"><value>24</value></Data>
      </ExtendedData>
      <Point><coordinates>-78.2,31.0,0</coordinates></Point>
    </Placemark>
  </Folder>
</Document>
</kml>"#;

pub const CONE_KML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
<Document>
  <Folder>
    <Placemark>
      <ExtendedData>
        <Data name="stormname"><value>ARTHUR</value></Data>
        <Data name="fcstpd"><value>120</value></Data>
      </ExtendedData>
      <Polygon>
        <outerBoundaryIs>
          <LinearRing>
            <coordinates>-80.0,25.0,0 -78.0,25.0,0 -78.0,32.0,0 -80.0,32.0,0 -80.0,25.0,0</coordinates>
          </LinearRing>
        </outerBoundaryIs>
      </Polygon>
    </Placemark>
  </Folder>
</Document>
</kml>"#;

pub const CLOSED_STORM_KML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://earth.google.com/kml/2.2">
<Document>
  <name> Hurricane Arthur </name>
  <Folder>
    <Placemark>
      <name>Tropical Depression ONE</name>
      <lat>27.5</lat>
      <lon>-78.3</lon>
      <stormName>ONE</stormName>
      <stormNum>01</stormNum>
      <basin>Atlantic</basin>
      <stormType>TD</stormType>
      <intensityMPH>35</intensityMPH>
      <intensityKPH>55</intensityKPH>
      <minSeaLevelPres>1009</minSeaLevelPres>
      <atcfdtg>2014070100</atcfdtg>
    </Placemark>
    <Folder>
      <Placemark>
        <name>Hurricane ARTHUR</name>
        <lat>34.0</lat>
        <lon>-76.8</lon>
        <stormName>ARTHUR</stormName>
        <stormNum>01</stormNum>
        <basin>Atlantic</basin>
        <stormType>HU</stormType>
        <intensityMPH>100</intensityMPH>
        <intensityKPH>155</intensityKPH>
        <minSeaLevelPres>973</minSeaLevelPres>
        <atcfdtg>2014070400</atcfdtg>
      </Placemark>
    </Folder>
  </Folder>
</Document>
</kml>"#;

pub const ACTIVE_KML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
<Document>
  <Folder id="at1">
    <name>Tropical Storm Arthur</name>
    <ExtendedData>
      <Data name="tcType"><value>TROPICAL STORM</value></Data>
      <Data name="tcName"><value>ARTHUR</value></Data>
      <Data name="wallet"><value>AT1</value></Data>
      <Data name="centerLat"><value>28.4</value></Data>
      <Data name="centerLon"><value>-79.5</value></Data>
      <Data name="dateTime"><value>11:00 PM EDT Tue Jul 01 2014</value></Data>
      <Data name="movement"><value>N at 3 mph</value></Data>
      <Data name="minimumPressure"><value>1004 mb</value></Data>
      <Data name="maxSustainedWind"><value>45 mph</value></Data>
      <Data name="headline"><value>...ARTHUR A LITTLE STRONGER...</value></Data>
    </ExtendedData>
    <NetworkLink id="at1bt">
      <Link><href>http://example.test/al012014_best_track.kmz</href></Link>
    </NetworkLink>
    <Folder id="at1forecast">
      <NetworkLink id="at1forecastTRACK">
        <Link><href>http://example.test/al012014_TRACK.kmz</href></Link>
      </NetworkLink>
      <NetworkLink id="at1forecastCONE">
        <Link><href>http://example.test/al012014_CONE.kmz</href></Link>
      </NetworkLink>
    </Folder>
  </Folder>
  <Folder id="ep2">
    <name>Hurricane Boris</name>
    <ExtendedData>
      <Data name="tcType"><value>HURRICANE</value></Data>
      <Data name="tcName"><value>BORIS</value></Data>
      <Data name="wallet"><value>EP2</value></Data>
      <Data name="centerLat"><value>14.9</value></Data>
      <Data name="centerLon"><value>-95.0</value></Data>
      <Data name="dateTime"><value>8:00 AM PDT Wed Jul 02 2014</value></Data>
      <Data name="minimumPressure"><value>unknown</value></Data>
      <Data name="maxSustainedWind"><value>75 mph</value></Data>
    </ExtendedData>
  </Folder>
  <Folder id="cp3">
    <name>Broken</name>
    <ExtendedData>
      <Data name="tcName"><value>BROKEN</value></Data>
      <Data name="wallet"><value>CP3</value></Data>
      <Data name="centerLon"><value>-150.0</value></Data>
      <Data name="dateTime"><value>8:00 AM HST Wed Jul 02 2014</value></Data>
    </ExtendedData>
  </Folder>
  <Folder id="wsp">
    <name>Wind Speed Probabilities</name>
  </Folder>
</Document>
</kml>"#;
