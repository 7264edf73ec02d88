//! Technical indicators over OHLCV bars.
//!
//! Every indicator stamps its output with the timestamp of the last bar in its
//! window and returns an empty series when the input is shorter than its
//! warm-up:
//! - Moving averages (SMA, EMA, WMA and the charted bundle)
//! - Momentum (RSI, MACD, Stochastic, Williams %R, CCI, ROC, Ultimate Oscillator)
//! - Trend (ADX, Parabolic SAR, Aroon, Elder Ray, linear regression channel)
//! - Volatility (ATR, Bollinger Bands, Keltner, Donchian, standard deviation)
//! - Volume (OBV, MFI, CMF, volume profile)
//!
//! Windowed sums in the statistics-heavy indicators use the SIMD helpers in
//! [`simd`].

pub mod momentum;
pub mod moving_average;
pub mod simd;
pub mod trend;
pub mod volatility;
pub mod volume;

pub use momentum::{
    Cci, Macd, MacdOutput, Roc, Rsi, Stochastic, StochasticOutput, UltimateOscillator, WilliamsR,
};
pub use moving_average::{ema_values, sma_values, wilder_values, Ema, MovingAverageBundle, Sma, Wma};
pub use trend::{
    Adx, AdxOutput, Aroon, AroonOutput, ElderRay, ElderRayOutput, LineFit, LinearRegression,
    ParabolicSar, RegressionOutput, SarOutput,
};
pub use volatility::{
    Atr, BollingerBands, BollingerOutput, ChannelOutput, DonchianChannels, KeltnerChannels, StdDev,
};
pub use volume::{Cmf, Mfi, Obv, ProfileBin, VolumeProfile, VolumeProfileOutput};
