//! A small streaming KML writer for maps of fire detections.
//!
//! Every detection becomes a placemark holding its pixel center and its nominal pixel footprint,
//! with a time span so viewers like Google Earth can animate the clusters through time.

use crate::{firepoint::FirePoint, geo::Coord, FireSpotsResult};
use chrono::{Duration, NaiveDateTime};
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

const FOOTER: &str = "</Document>\n</kml>\n";

/// A KML document being written to a file.
pub type KmlFile = KmlWriter<BufWriter<File>>;

/// How to draw a group of placemarks.
#[derive(Debug, Clone, Copy)]
pub struct PlacemarkStyle<'a> {
    /// Referenced from placemarks as `#id`.
    pub id: &'a str,
    pub icon_url: &'a str,
    pub icon_scale: f64,
    /// KML colors are aabbggrr hex.
    pub fill_color: &'a str,
    pub outline: bool,
}

/// Writes one KML document, elements must be opened and closed in order.
pub struct KmlWriter<W: Write> {
    out: W,
    finished: bool,
}

impl KmlFile {
    pub fn create<P: AsRef<Path>>(path: P) -> FireSpotsResult<Self> {
        let f = File::create(path.as_ref())?;
        KmlWriter::new(BufWriter::new(f))
    }
}

impl<W: Write> KmlWriter<W> {
    /// Start a document.
    pub fn new(mut out: W) -> FireSpotsResult<Self> {
        out.write_all(
            concat!(
                "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
                "<kml xmlns=\"http://www.opengis.net/kml/2.2\">\n",
                "<Document>\n",
            )
            .as_bytes(),
        )?;

        Ok(KmlWriter {
            out,
            finished: false,
        })
    }

    pub fn style(&mut self, style: &PlacemarkStyle) -> FireSpotsResult<()> {
        writeln!(self.out, "<Style id=\"{}\">", escape(style.id))?;
        writeln!(
            self.out,
            "<IconStyle><scale>{}</scale><Icon><href>{}</href></Icon></IconStyle>",
            style.icon_scale,
            escape(style.icon_url)
        )?;
        writeln!(
            self.out,
            "<PolyStyle><color>{}</color><fill>1</fill><outline>{}</outline></PolyStyle>",
            style.fill_color,
            u8::from(style.outline)
        )?;
        writeln!(self.out, "</Style>")?;
        Ok(())
    }

    pub fn start_folder(&mut self, name: &str, description: &str) -> FireSpotsResult<()> {
        writeln!(self.out, "<Folder>")?;
        writeln!(self.out, "<name>{}</name>", escape(name))?;
        self.description(description)
    }

    pub fn finish_folder(&mut self) -> FireSpotsResult<()> {
        writeln!(self.out, "</Folder>")?;
        Ok(())
    }

    /**
     * Write a complete placemark for a detection.
     *
     * #Arguments
     * pnt - the detection, its footprint is a square with the instrument's pixel size.
     * style_id - id of a style already written with [KmlWriter::style].
     * visible_for - how long after the acquisition time the placemark stays on the map.
     */
    pub fn fire_placemark(
        &mut self,
        pnt: &FirePoint,
        style_id: &str,
        visible_for: Duration,
    ) -> FireSpotsResult<()> {
        writeln!(self.out, "<Placemark>")?;
        writeln!(self.out, "<name>{:.1} MW</name>", pnt.frp)?;
        self.description(&pnt.to_string())?;
        writeln!(self.out, "<styleUrl>#{}</styleUrl>", escape(style_id))?;
        self.timespan(pnt.acquired, pnt.acquired + visible_for)?;

        writeln!(self.out, "<MultiGeometry>")?;
        writeln!(
            self.out,
            "<Point><coordinates>{},{},0</coordinates></Point>",
            pnt.longitude(),
            pnt.latitude()
        )?;
        self.polygon(&pnt.coord.square_around(pnt.radius_km()))?;
        writeln!(self.out, "</MultiGeometry>")?;

        writeln!(self.out, "</Placemark>")?;
        Ok(())
    }

    /// Close the document and flush it.
    pub fn finish(&mut self) -> FireSpotsResult<()> {
        if !self.finished {
            self.finished = true;
            self.out.write_all(FOOTER.as_bytes())?;
        }
        self.out.flush()?;
        Ok(())
    }

    fn description(&mut self, text: &str) -> FireSpotsResult<()> {
        writeln!(self.out, "<description><![CDATA[{}]]></description>", text)?;
        Ok(())
    }

    fn timespan(&mut self, begin: NaiveDateTime, end: NaiveDateTime) -> FireSpotsResult<()> {
        const FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";
        writeln!(
            self.out,
            "<TimeSpan><begin>{}</begin><end>{}</end></TimeSpan>",
            begin.format(FORMAT),
            end.format(FORMAT)
        )?;
        Ok(())
    }

    /// A closed ring draped on the ground.
    fn polygon(&mut self, corners: &[Coord]) -> FireSpotsResult<()> {
        writeln!(self.out, "<Polygon><tessellate>1</tessellate><outerBoundaryIs><LinearRing>")?;
        write!(self.out, "<coordinates>")?;
        for Coord { lat, lon } in corners.iter().chain(corners.first()) {
            write!(self.out, "{},{},0 ", lon, lat)?;
        }
        writeln!(self.out, "</coordinates>")?;
        writeln!(self.out, "</LinearRing></outerBoundaryIs></Polygon>")?;
        Ok(())
    }
}

impl<W: Write> Drop for KmlWriter<W> {
    fn drop(&mut self) {
        if !self.finished {
            let _ = self.out.write_all(FOOTER.as_bytes());
        }
    }
}

/// Escape the characters that can't appear in XML text or attributes.
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::instrument::Instrument;

    #[test]
    fn test_document() {
        let pnt = FirePoint::new(Instrument::MODIS, "2015-08-01", 830, -8.5, -45.0, 12.34).unwrap();

        let mut out = vec![];
        {
            let mut kml = KmlWriter::new(&mut out).unwrap();
            kml.style(&PlacemarkStyle {
                id: "top",
                icon_url: "fire.png",
                icon_scale: 1.5,
                fill_color: "ff0000ff",
                outline: true,
            })
            .unwrap();
            kml.start_folder("Group 001 & co", "biggest").unwrap();
            kml.fire_placemark(&pnt, "top", Duration::hours(24)).unwrap();
            kml.finish_folder().unwrap();
            kml.finish().unwrap();
        }
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("<?xml"));
        assert!(text.contains("<Style id=\"top\">"));
        assert!(text.contains("<outline>1</outline>"));
        assert!(text.contains("<name>Group 001 &amp; co</name>"));
        assert!(text.contains("<name>12.3 MW</name>"));
        assert!(text.contains("<styleUrl>#top</styleUrl>"));
        assert!(text.contains(
            "<begin>2015-08-01T08:30:00Z</begin><end>2015-08-02T08:30:00Z</end>"
        ));
        assert!(text.contains("<Point><coordinates>-45,-8.5,0</coordinates></Point>"));
        assert!(text.ends_with("</Document>\n</kml>\n"));
        assert_eq!(text.matches("</kml>").count(), 1);
    }

    #[test]
    fn test_footprint_is_closed() {
        let mut out = vec![];
        {
            let mut kml = KmlWriter::new(&mut out).unwrap();
            let corners = [
                Coord { lat: 1.0, lon: 1.0 },
                Coord { lat: 0.0, lon: 1.0 },
                Coord { lat: 0.0, lon: 2.0 },
            ];
            kml.polygon(&corners).unwrap();
        }
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("<coordinates>1,1,0 1,0,0 2,0,0 1,1,0 </coordinates>"));
        // Dropped without finishing still closes the document.
        assert!(text.ends_with("</kml>\n"));
    }
}
