/*!
 * All the data related to a point with fire detected.
 *
 * A FirePoint is a structure that holds all data associated with a single row of a FIRMS active
 * fire archive that is needed to decide if two detections are part of the same hotspot.
 */

use crate::{geo::Coord, instrument::Instrument, FireSpotsError, FireSpotsResult};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::fmt::{self, Display};

const SECONDS_PER_DAY: f64 = 86_400.0;

/**
 * Represents all the data associated with a single pixel in which a satellite instrument has
 * detected a fire.
 */
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FirePoint {
    /// The instrument that made the detection.
    pub instrument: Instrument,
    /// Acquisition date and time (UTC).
    pub acquired: NaiveDateTime,
    /// Location of the center of the pixel.
    pub coord: Coord,
    /// The fire radiative power in megawatts.
    pub frp: f64,
}

impl FirePoint {
    /**
     * Build a FirePoint from the raw values found in a FIRMS CSV file.
     *
     * #Arguments
     * instrument - which instrument made the detection.
     * acq_date - the acquisition date as YYYY-MM-DD.
     * acq_time - the acquisition time as a 2 to 4 digit UTC integer, e.g. 830 is 08:30.
     * latitude, longitude - location in degrees.
     * frp - fire radiative power in megawatts.
     */
    pub fn new(
        instrument: Instrument,
        acq_date: &str,
        acq_time: u32,
        latitude: f64,
        longitude: f64,
        frp: f64,
    ) -> FireSpotsResult<Self> {
        let acquired = acquisition_datetime(acq_date, acq_time)?;

        Ok(FirePoint {
            instrument,
            acquired,
            coord: Coord {
                lat: latitude,
                lon: longitude,
            },
            frp,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.coord.lat
    }

    pub fn longitude(&self) -> f64 {
        self.coord.lon
    }

    /// The nominal radius of the detection in kilometers, from the instrument pixel size.
    pub fn radius_km(&self) -> f64 {
        self.instrument.pixel_size_km()
    }

    /// The great circle distance to another point in kilometers.
    pub fn distance_km(&self, other: &FirePoint) -> f64 {
        self.coord.distance_km(&other.coord)
    }

    /// The absolute time between the acquisition of two points.
    pub fn time_between(&self, other: &FirePoint) -> Duration {
        let delta = self.acquired.signed_duration_since(other.acquired);
        if delta < Duration::zero() {
            -delta
        } else {
            delta
        }
    }

    /// Are the points strictly closer than `distance_cutoff_km` kilometers?
    pub fn is_spatially_close_to(&self, other: &FirePoint, distance_cutoff_km: f64) -> bool {
        self.distance_km(other) < distance_cutoff_km
    }

    /// Were the points acquired strictly less than `time_cutoff_days` days apart?
    pub fn is_temporally_close_to(&self, other: &FirePoint, time_cutoff_days: f64) -> bool {
        (self.time_between(other).num_seconds() as f64) < time_cutoff_days * SECONDS_PER_DAY
    }

    /// Are the points close to each other both in space and in time?
    pub fn is_neighbor_of(
        &self,
        other: &FirePoint,
        distance_cutoff_km: f64,
        time_cutoff_days: f64,
    ) -> bool {
        self.is_spatially_close_to(other, distance_cutoff_km)
            && self.is_temporally_close_to(other, time_cutoff_days)
    }
}

impl Display for FirePoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        write!(
            f,
            "FirePoint(frp={:?}, date={}, coords={}, instrument={})",
            self.frp,
            self.acquired.format("%Y-%m-%d %H:%M:%S"),
            self.coord,
            self.instrument
        )
    }
}

/// Hours and minutes decoded from a FIRMS `acq_time` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtcTime {
    pub hour: u32,
    pub minute: u32,
}

impl UtcTime {
    /// The last two digits are the minutes, anything in front of them is the hour.
    pub fn from_utc_integer(time: u32) -> Self {
        UtcTime {
            hour: time / 100,
            minute: time % 100,
        }
    }
}

/// Combine a `YYYY-MM-DD` date and a UTC time integer into a single date and time.
pub fn acquisition_datetime(acq_date: &str, acq_time: u32) -> FireSpotsResult<NaiveDateTime> {
    let date = NaiveDate::parse_from_str(acq_date.trim(), "%Y-%m-%d").map_err(|err| {
        FireSpotsError::Parse(format!("invalid acquisition date '{}': {}", acq_date, err))
    })?;

    let UtcTime { hour, minute } = UtcTime::from_utc_integer(acq_time);

    date.and_hms_opt(hour, minute, 0).ok_or_else(|| {
        FireSpotsError::Parse(format!("invalid acquisition time '{}'", acq_time))
    })
}
